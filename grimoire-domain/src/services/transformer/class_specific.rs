use serde_json::{json, Map, Value};

use super::core_stats::primary_class_name;
use super::export::{array, i64_at, str_at};

fn class_option_names<'a>(root: &'a Value, needle: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    array(root, &["options", "class"])
        .iter()
        .filter_map(|option| str_at(option, &["definition", "name"]))
        .filter(move |name| name.to_lowercase().contains(needle))
}

pub(super) fn extract_class_specific(root: &Value) -> Map<String, Value> {
    let mut data = Map::new();
    let Some(class_name) = primary_class_name(root) else {
        return data;
    };
    let primary_level = array(root, &["classes"])
        .first()
        .and_then(|class| i64_at(class, &["level"]))
        .unwrap_or(0);

    match class_name.as_str() {
        "wizard" => {
            let spellbook: Vec<&str> = array(root, &["spells", "class"])
                .iter()
                .filter_map(|spell| str_at(spell, &["definition", "name"]))
                .collect();
            data.insert("spellbook".to_string(), json!(spellbook));
        }
        "warlock" => {
            let invocations: Vec<&str> = class_option_names(root, "invocation").collect();
            data.insert("invocations".to_string(), json!(invocations));
            if let Some(pact) = class_option_names(root, "pact of").next() {
                data.insert("pactType".to_string(), json!(pact));
            }
        }
        "monk" => {
            data.insert("kiPointsMax".to_string(), json!(primary_level));
        }
        "sorcerer" => {
            data.insert("sorceryPointsMax".to_string(), json!(primary_level));
            let metamagic: Vec<&str> = class_option_names(root, "metamagic").collect();
            data.insert("metamagic".to_string(), json!(metamagic));
        }
        _ => {}
    }
    data
}
