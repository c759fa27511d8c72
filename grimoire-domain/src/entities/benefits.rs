// Structured feat benefits mined from wiki text

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::character::SenseType;
use crate::value_objects::Ability;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatBenefits {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability_score_increase: Option<AbilityScoreIncrease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proficiencies: Option<ProficiencyGrants>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spells: Vec<SpellGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonuses: Option<Bonuses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fighting_styles: Option<FightingStyleGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<ExpertiseGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advantages: Option<AdvantageGrants>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistances: Option<Resistances>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub senses: BTreeMap<SenseType, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<MovementGrants>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_mastery: Option<WeaponMasteryGrant>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceClause>,
}

impl FeatBenefits {
    /// True when nothing beyond the raw effect lines was recognized.
    pub fn is_structurally_empty(&self) -> bool {
        self.ability_score_increase.is_none()
            && self.proficiencies.is_none()
            && self.spells.is_empty()
            && self.bonuses.is_none()
            && self.fighting_styles.is_none()
            && self.expertise.is_none()
            && self.advantages.is_none()
            && self.resistances.is_none()
            && self.senses.is_empty()
            && self.movement.is_none()
            && self.weapon_mastery.is_none()
            && self.resources.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AbilityScoreIncrease {
    Fixed { fixed: Ability, amount: u8 },
    Choice { choice: Vec<Ability>, amount: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProficiencyGrants {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weapons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub armor: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

impl ProficiencyGrants {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.tools.is_empty()
            && self.weapons.is_empty()
            && self.armor.is_empty()
            && self.languages.is_empty()
            && self.other.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpellGrant {
    Named { name: String },
    Choice { choice: SpellChoice },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellChoice {
    pub count: u32,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bonuses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<HpBonus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative: Option<i64>,
}

impl Bonuses {
    pub fn is_empty(&self) -> bool {
        self.hp.is_none()
            && self.speed.is_none()
            && self.ac.is_none()
            && self.attack.is_none()
            && self.damage.is_none()
            && self.initiative.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HpBonus {
    Flat(i64),
    Scaling {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<i64>,
        #[serde(rename = "perLevel")]
        per_level: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FightingStyleGrant {
    #[serde(default)]
    pub choice: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpertiseGrant {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdvantageGrants {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saves: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

impl AdvantageGrants {
    pub fn is_empty(&self) -> bool {
        self.saves.is_empty() && self.checks.is_empty() && self.conditions.is_empty() && self.other.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resistances {
    pub damage_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementGrants {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climb: Option<MovementSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swim: Option<MovementSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fly: Option<MovementSpeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovementSpeed {
    Feet(i64),
    /// e.g. "walking speed"
    EqualTo(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponMasteryGrant {
    pub choice: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceClause {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recharge: Option<String>,
}

/// Benefit categories an extractor knows how to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitCapability {
    Effects,
    AbilityScoreIncrease,
    Proficiencies,
    Spells,
    Bonuses,
    FightingStyles,
    Expertise,
    Advantages,
    Resistances,
    Senses,
    Movement,
    WeaponMastery,
    Resources,
}

impl BenefitCapability {
    pub const ALL: [BenefitCapability; 13] = [
        BenefitCapability::Effects,
        BenefitCapability::AbilityScoreIncrease,
        BenefitCapability::Proficiencies,
        BenefitCapability::Spells,
        BenefitCapability::Bonuses,
        BenefitCapability::FightingStyles,
        BenefitCapability::Expertise,
        BenefitCapability::Advantages,
        BenefitCapability::Resistances,
        BenefitCapability::Senses,
        BenefitCapability::Movement,
        BenefitCapability::WeaponMastery,
        BenefitCapability::Resources,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_only_recognized_sections_in_camel_case() {
        let benefits = FeatBenefits {
            ability_score_increase: Some(AbilityScoreIncrease::Choice {
                choice: vec![Ability::Strength, Ability::Dexterity],
                amount: 1,
            }),
            bonuses: Some(Bonuses {
                hp: Some(HpBonus::Scaling {
                    base: None,
                    per_level: 2,
                }),
                ..Bonuses::default()
            }),
            ..FeatBenefits::default()
        };
        let value = serde_json::to_value(&benefits).expect("serializes");
        assert_eq!(
            value,
            json!({
                "abilityScoreIncrease": {"choice": ["strength", "dexterity"], "amount": 1},
                "bonuses": {"hp": {"perLevel": 2}}
            })
        );
    }

    #[test]
    fn flat_hp_bonus_reads_back_as_a_number() {
        let bonus: HpBonus = serde_json::from_value(json!(5)).expect("parses");
        assert_eq!(bonus, HpBonus::Flat(5));
    }
}
