use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::export::{array, modifiers, nonzero_i64_at, str_at, SENSE_SOURCES};
use crate::entities::{CharacterSense, SenseType};

const DEFAULT_TRAIT_RANGE: i64 = 60;

/// Keeps the largest range per sense type.
fn merge(senses: &mut Vec<CharacterSense>, sense: CharacterSense) {
    match senses.iter_mut().find(|existing| existing.sense_type == sense.sense_type) {
        Some(existing) if existing.range < sense.range => *existing = sense,
        Some(_) => {}
        None => senses.push(sense),
    }
}

fn from_modifiers(root: &Value) -> Vec<CharacterSense> {
    let mut senses = Vec::new();
    for modifier in modifiers(root, &SENSE_SOURCES) {
        if !matches!(str_at(modifier, &["type"]), Some("set-base") | Some("sense")) {
            continue;
        }
        let Some(sense_type) = str_at(modifier, &["subType"]).and_then(SenseType::from_label) else {
            continue;
        };
        let range = nonzero_i64_at(modifier, &["value"])
            .or_else(|| nonzero_i64_at(modifier, &["fixedValue"]))
            .unwrap_or(0);
        if range > 0 {
            merge(
                &mut senses,
                CharacterSense {
                    sense_type,
                    range,
                    notes: None,
                },
            );
        }
    }
    senses
}

/// `<sense> <feet>` in lowercased trait text, one pattern per sense type.
fn range_pattern(sense_type: SenseType) -> &'static Regex {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        SenseType::ALL.map(|sense| Regex::new(&format!(r"{}\s+(\d+)", sense.as_str())).expect("valid regex"))
    });
    let index = match sense_type {
        SenseType::Darkvision => 0,
        SenseType::Blindsight => 1,
        SenseType::Tremorsense => 2,
        SenseType::Truesight => 3,
    };
    &patterns[index]
}

fn from_traits(root: &Value) -> Vec<CharacterSense> {
    let mut senses = Vec::new();
    for entry in array(root, &["traits"]) {
        let description = str_at(entry, &["description"]).unwrap_or("").to_lowercase();
        for sense_type in SenseType::ALL {
            if !description.contains(sense_type.as_str()) {
                continue;
            }
            let range = range_pattern(sense_type)
                .captures(&description)
                .and_then(|captures| captures.get(1))
                .and_then(|matched| matched.as_str().parse().ok())
                .unwrap_or(DEFAULT_TRAIT_RANGE);
            merge(
                &mut senses,
                CharacterSense {
                    sense_type,
                    range,
                    notes: str_at(entry, &["name"]).map(ToString::to_string),
                },
            );
        }
    }
    senses
}

/// Modifier senses win; trait text is only scanned when no modifier names a sense.
pub(super) fn extract_senses(root: &Value) -> Vec<CharacterSense> {
    let senses = from_modifiers(root);
    if senses.is_empty() {
        from_traits(root)
    } else {
        senses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trait_text_ranges_come_from_one_cached_pattern_per_sense() {
        let root = json!({
            "traits": [
                {"name": "Superior Darkvision", "description": "You have Darkvision 120 feet."},
                {"name": "Keen Senses", "description": "You have tremorsense 30 feet and blindsight out to a short range."}
            ]
        });
        let senses = extract_senses(&root);
        let range = |sense_type| senses.iter().find(|sense| sense.sense_type == sense_type).map(|sense| sense.range);
        assert_eq!(range(SenseType::Darkvision), Some(120));
        assert_eq!(range(SenseType::Tremorsense), Some(30));
        assert_eq!(range(SenseType::Blindsight), Some(DEFAULT_TRAIT_RANGE));
        assert_eq!(range(SenseType::Truesight), None);

        for sense_type in SenseType::ALL {
            assert!(std::ptr::eq(range_pattern(sense_type), range_pattern(sense_type)));
            assert!(range_pattern(sense_type).as_str().starts_with(sense_type.as_str()));
        }
    }
}
