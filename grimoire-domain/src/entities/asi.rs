use serde::{Deserialize, Serialize};

use crate::error::AsiError;
use crate::value_objects::Ability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsiSourceType {
    Background,
    Level,
    Feat,
    Race,
    Item,
    Other,
}

impl AsiSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AsiSourceType::Background => "background",
            AsiSourceType::Level => "level",
            AsiSourceType::Feat => "feat",
            AsiSourceType::Race => "race",
            AsiSourceType::Item => "item",
            AsiSourceType::Other => "other",
        }
    }
}

impl std::fmt::Display for AsiSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScoreImprovement {
    pub ability: Ability,
    pub amount: u8,
    pub source: String,
    pub source_type: AsiSourceType,
}

impl AbilityScoreImprovement {
    pub fn group_key(&self) -> String {
        group_key(&self.source, self.source_type)
    }
}

pub fn group_key(source: &str, source_type: AsiSourceType) -> String {
    format!("{}::{}", source, source_type)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityGrant {
    pub ability: Ability,
    pub amount: u8,
}

/// Improvements sharing one `source::sourceType` key, as edited by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsiGroup {
    pub source: String,
    pub source_type: AsiSourceType,
    pub abilities: Vec<AbilityGrant>,
}

impl AsiGroup {
    pub fn key(&self) -> String {
        group_key(&self.source, self.source_type)
    }

    pub fn validate(&self) -> Result<(), AsiError> {
        if self.source.trim().is_empty() {
            return Err(AsiError::EmptySource);
        }
        if self.abilities.is_empty() {
            return Err(AsiError::EmptyGroup);
        }
        for grant in &self.abilities {
            if !(1..=3).contains(&grant.amount) {
                return Err(AsiError::AmountOutOfRange {
                    ability: grant.ability,
                    amount: grant.amount,
                });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<AbilityScoreImprovement> {
        self.abilities
            .iter()
            .map(|grant| AbilityScoreImprovement {
                ability: grant.ability,
                amount: grant.amount,
                source: self.source.clone(),
                source_type: self.source_type,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsiGroupRef {
    pub source: String,
    pub source_type: AsiSourceType,
}

impl AsiGroupRef {
    pub fn key(&self) -> String {
        group_key(&self.source, self.source_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsiAction {
    Add(AsiGroup),
    Edit { previous: AsiGroupRef, group: AsiGroup },
    Remove(AsiGroupRef),
}

/// Groups in first-seen key order.
pub fn group_improvements(list: &[AbilityScoreImprovement]) -> Vec<AsiGroup> {
    let mut groups: Vec<AsiGroup> = Vec::new();
    for entry in list {
        let grant = AbilityGrant {
            ability: entry.ability,
            amount: entry.amount,
        };
        match groups
            .iter_mut()
            .find(|group| group.source == entry.source && group.source_type == entry.source_type)
        {
            Some(group) => group.abilities.push(grant),
            None => groups.push(AsiGroup {
                source: entry.source.clone(),
                source_type: entry.source_type,
                abilities: vec![grant],
            }),
        }
    }
    groups
}

pub fn flatten_groups(groups: &[AsiGroup]) -> Vec<AbilityScoreImprovement> {
    groups.iter().flat_map(AsiGroup::entries).collect()
}

/// Applies an operator action to the flat improvement list without mutating it.
pub fn apply_asi_action(
    list: &[AbilityScoreImprovement],
    action: &AsiAction,
) -> Result<Vec<AbilityScoreImprovement>, AsiError> {
    match action {
        AsiAction::Add(group) => {
            group.validate()?;
            let mut next = list.to_vec();
            next.extend(group.entries());
            Ok(next)
        }
        AsiAction::Edit { previous, group } => {
            group.validate()?;
            let previous_key = previous.key();
            if !list.iter().any(|entry| entry.group_key() == previous_key) {
                return Err(AsiError::UnknownGroup(previous_key));
            }
            let new_key = group.key();
            let mut next: Vec<AbilityScoreImprovement> = list
                .iter()
                .filter(|entry| {
                    let key = entry.group_key();
                    key != previous_key && key != new_key
                })
                .cloned()
                .collect();
            next.extend(group.entries());
            Ok(next)
        }
        AsiAction::Remove(target) => {
            let key = target.key();
            if !list.iter().any(|entry| entry.group_key() == key) {
                return Err(AsiError::UnknownGroup(key));
            }
            Ok(list
                .iter()
                .filter(|entry| entry.group_key() != key)
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asi(ability: Ability, amount: u8, source: &str, source_type: AsiSourceType) -> AbilityScoreImprovement {
        AbilityScoreImprovement {
            ability,
            amount,
            source: source.to_string(),
            source_type,
        }
    }

    fn sample() -> Vec<AbilityScoreImprovement> {
        vec![
            asi(Ability::Wisdom, 2, "Sage", AsiSourceType::Background),
            asi(Ability::Intelligence, 1, "Sage", AsiSourceType::Background),
            asi(Ability::Strength, 2, "Ability Score Improvement", AsiSourceType::Level),
        ]
    }

    #[test]
    fn grouping_round_trips_in_first_seen_order() {
        let list = sample();
        let groups = group_improvements(&list);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key(), "Sage::background");
        assert_eq!(groups[0].abilities.len(), 2);
        assert_eq!(flatten_groups(&groups), list);
    }

    #[test]
    fn edit_fully_replaces_previous_and_target_keys() {
        let list = sample();
        let action = AsiAction::Edit {
            previous: AsiGroupRef {
                source: "Sage".to_string(),
                source_type: AsiSourceType::Background,
            },
            group: AsiGroup {
                source: "Ability Score Improvement".to_string(),
                source_type: AsiSourceType::Level,
                abilities: vec![AbilityGrant {
                    ability: Ability::Dexterity,
                    amount: 1,
                }],
            },
        };
        let next = apply_asi_action(&list, &action).expect("edit applies");
        assert_eq!(
            next,
            vec![asi(Ability::Dexterity, 1, "Ability Score Improvement", AsiSourceType::Level)]
        );
        // input untouched
        assert_eq!(list, sample());
    }

    #[test]
    fn add_rejects_out_of_range_amounts_and_empty_groups() {
        let bad_amount = AsiAction::Add(AsiGroup {
            source: "Elf".to_string(),
            source_type: AsiSourceType::Race,
            abilities: vec![AbilityGrant {
                ability: Ability::Dexterity,
                amount: 4,
            }],
        });
        assert!(matches!(
            apply_asi_action(&[], &bad_amount),
            Err(AsiError::AmountOutOfRange { amount: 4, .. })
        ));

        let empty = AsiAction::Add(AsiGroup {
            source: "Elf".to_string(),
            source_type: AsiSourceType::Race,
            abilities: Vec::new(),
        });
        assert_eq!(apply_asi_action(&[], &empty), Err(AsiError::EmptyGroup));
    }

    #[test]
    fn remove_drops_every_entry_under_the_key() {
        let next = apply_asi_action(
            &sample(),
            &AsiAction::Remove(AsiGroupRef {
                source: "Sage".to_string(),
                source_type: AsiSourceType::Background,
            }),
        )
        .expect("remove applies");
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].ability, Ability::Strength);

        let missing = apply_asi_action(
            &next,
            &AsiAction::Remove(AsiGroupRef {
                source: "Sage".to_string(),
                source_type: AsiSourceType::Background,
            }),
        );
        assert_eq!(missing, Err(AsiError::UnknownGroup("Sage::background".to_string())));
    }
}
