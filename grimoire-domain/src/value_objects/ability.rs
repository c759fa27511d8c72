// Ability value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }

    /// Stat ids used by the export's `stats[]` block (1 = strength .. 6 = charisma).
    pub fn from_stat_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Ability::Strength),
            2 => Some(Ability::Dexterity),
            3 => Some(Ability::Constitution),
            4 => Some(Ability::Intelligence),
            5 => Some(Ability::Wisdom),
            6 => Some(Ability::Charisma),
            _ => None,
        }
    }

    /// Case-insensitive match on the full ability name.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        Ability::ALL.into_iter().find(|ability| ability.as_str() == lower)
    }

    /// Slug of the matching saving-throw proficiency modifier.
    pub fn saving_throw_slug(&self) -> String {
        format!("{}-saving-throws", self.as_str())
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_lookup_ignores_case_and_padding() {
        assert_eq!(Ability::from_label(" Wisdom "), Some(Ability::Wisdom));
        assert_eq!(Ability::from_label("CHARISMA"), Some(Ability::Charisma));
        assert_eq!(Ability::from_label("Luck"), None);
    }

    #[test]
    fn stat_ids_cover_all_six_abilities() {
        let mapped = (1..=6)
            .filter_map(Ability::from_stat_id)
            .collect::<Vec<_>>();
        assert_eq!(mapped, Ability::ALL.to_vec());
        assert_eq!(Ability::from_stat_id(7), None);
    }
}
