use serde_json::Value;
use std::collections::HashMap;

use super::export::{array, id_at, str_at};
use super::feats::feat_source;
use crate::entities::{AbilityScoreImprovement, AsiSourceType, FeatSource};
use crate::value_objects::Ability;

fn is_asi_feat(name: &str) -> bool {
    name.ends_with("Ability Score Improvement") || name.ends_with("Ability Score Improvements")
}

/// option id -> ability, from the first choice definition whose options name abilities.
fn ability_options(root: &Value) -> HashMap<String, Ability> {
    let definition = array(root, &["choices", "choiceDefinitions"]).iter().find(|definition| {
        array(definition, &["options"])
            .iter()
            .any(|option| str_at(option, &["label"]).and_then(Ability::from_label).is_some())
    });
    let Some(definition) = definition else {
        return HashMap::new();
    };
    array(definition, &["options"])
        .iter()
        .filter_map(|option| {
            let id = id_at(option, &["id"])?;
            let ability = str_at(option, &["label"]).and_then(Ability::from_label)?;
            Some((id, ability))
        })
        .collect()
}

fn amount_from_label(label: &str) -> u8 {
    if label.contains("+2") {
        2
    } else if label.contains("+3") {
        3
    } else {
        1
    }
}

pub(super) fn extract_improvements(root: &Value, warnings: &mut Vec<String>) -> Vec<AbilityScoreImprovement> {
    let options = ability_options(root);
    let choices = array(root, &["choices", "feat"]);
    let background = str_at(root, &["background", "definition", "name"]).unwrap_or("Background");
    let mut improvements = Vec::new();

    for feat in array(root, &["feats"]) {
        let Some(name) = str_at(feat, &["definition", "name"]) else {
            continue;
        };
        if !is_asi_feat(name) {
            continue;
        }
        if options.is_empty() {
            warnings.push(format!("could not map ability choices for \"{}\"", name));
            continue;
        }
        let Some(feat_id) = id_at(feat, &["definition", "id"]) else {
            continue;
        };
        let (source, source_type) = match feat_source(feat) {
            FeatSource::Background => (background, AsiSourceType::Background),
            FeatSource::Level => ("Ability Score Improvement", AsiSourceType::Level),
        };
        for choice in choices
            .iter()
            .filter(|choice| id_at(choice, &["componentId"]).as_deref() == Some(feat_id.as_str()))
        {
            let Some(ability) = id_at(choice, &["optionValue"]).and_then(|value| options.get(&value).copied())
            else {
                continue;
            };
            improvements.push(AbilityScoreImprovement {
                ability,
                amount: amount_from_label(str_at(choice, &["label"]).unwrap_or("")),
                source: source.to_string(),
                source_type,
            });
        }
    }
    improvements
}
