use serde_json::Value;
use std::collections::HashMap;

use super::export::{array, at, i64_at, id_at, str_at};
use super::BACKGROUND_COMPONENT_TYPE;
use crate::entities::{CharacterFeat, FeatChoices, FeatSelection, FeatSource};
use crate::value_objects::Ability;

const PLACEHOLDER_FEATS: [&str; 1] = ["Dark Bargain"];

fn is_skipped(name: &str) -> bool {
    PLACEHOLDER_FEATS.contains(&name) || name.ends_with("Ability Score Improvements")
}

pub(super) fn feat_source(feat: &Value) -> FeatSource {
    if i64_at(feat, &["componentTypeId"]) == Some(BACKGROUND_COMPONENT_TYPE) {
        FeatSource::Background
    } else {
        FeatSource::Level
    }
}

/// definition id -> name over a list of `{definition: {id, name}}` entries.
fn definition_names<'a>(entries: impl Iterator<Item = &'a Value>) -> HashMap<String, String> {
    entries
        .filter_map(|entry| {
            let id = id_at(entry, &["definition", "id"])?;
            let name = str_at(entry, &["definition", "name"])?;
            Some((id, name.to_string()))
        })
        .collect()
}

struct OptionNames {
    spells: HashMap<String, String>,
    options: HashMap<String, String>,
}

impl OptionNames {
    fn from_export(root: &Value) -> Self {
        let spell_groups = ["class", "race", "feat", "item"];
        Self {
            spells: definition_names(
                spell_groups
                    .iter()
                    .flat_map(|group| array(root, &["spells", *group]).iter()),
            ),
            options: definition_names(array(root, &["options", "feat"]).iter()),
        }
    }

    fn resolve(&self, option_value: Option<&String>) -> Option<String> {
        let value = option_value?;
        self.spells
            .get(value)
            .or_else(|| self.options.get(value))
            .cloned()
    }
}

fn feat_choices(feat_id: Option<&str>, choices: &[Value], names: &OptionNames) -> Option<FeatChoices> {
    let feat_id = feat_id?;
    let selections: Vec<FeatSelection> = choices
        .iter()
        .filter(|choice| id_at(choice, &["componentId"]).as_deref() == Some(feat_id))
        .map(|choice| {
            let option_value = id_at(choice, &["optionValue"]);
            FeatSelection {
                id: id_at(choice, &["id"]),
                label: str_at(choice, &["label"]).map(ToString::to_string),
                choice_type: i64_at(choice, &["type"]),
                sub_type: i64_at(choice, &["subType"]),
                option_name: names.resolve(option_value.as_ref()),
                option_value,
            }
        })
        .collect();
    if selections.is_empty() {
        return None;
    }

    let spells_chosen: Vec<String> = selections
        .iter()
        .filter(|selection| {
            selection
                .label
                .as_deref()
                .map(|label| label.to_lowercase().contains("spell"))
                .unwrap_or(false)
        })
        .filter_map(|selection| selection.option_name.clone())
        .collect();
    let ability_choice = selections
        .iter()
        .filter_map(|selection| selection.option_name.as_deref())
        .find_map(Ability::from_label);

    Some(FeatChoices {
        selections,
        spells_chosen: (!spells_chosen.is_empty()).then_some(spells_chosen),
        ability_choice,
    })
}

pub(super) fn extract_feats(root: &Value) -> Vec<CharacterFeat> {
    let choices = array(root, &["choices", "feat"]);
    let names = OptionNames::from_export(root);
    array(root, &["feats"])
        .iter()
        .filter(|feat| at(feat, &["definition"]).is_some())
        .filter_map(|feat| {
            let name = str_at(feat, &["definition", "name"])?;
            if is_skipped(name) {
                return None;
            }
            let feat_id = id_at(feat, &["definition", "id"]);
            Some(CharacterFeat {
                name: name.to_string(),
                source: feat_source(feat),
                choices: feat_choices(feat_id.as_deref(), choices, &names),
            })
        })
        .collect()
}
