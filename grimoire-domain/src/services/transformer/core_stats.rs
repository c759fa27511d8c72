use serde_json::Value;

use super::export::{array, i64_at, nonzero_i64_at, str_at};
use super::skills::save_proficiencies;
use crate::entities::{AbilityScores, CharacterCore, ClassLevel};
use crate::value_objects::Ability;

const SPELLCASTING: [(&str, &str); 9] = [
    ("wizard", "int"),
    ("artificer", "int"),
    ("sorcerer", "cha"),
    ("warlock", "cha"),
    ("bard", "cha"),
    ("paladin", "cha"),
    ("cleric", "wis"),
    ("druid", "wis"),
    ("ranger", "wis"),
];

pub(super) fn primary_class_name(root: &Value) -> Option<String> {
    array(root, &["classes"])
        .first()
        .and_then(|class| str_at(class, &["definition", "name"]))
        .map(|name| name.to_lowercase())
}

pub fn spellcasting_ability(class_name: &str) -> Option<String> {
    SPELLCASTING
        .iter()
        .find(|(class, _)| *class == class_name)
        .map(|(_, ability)| ability.to_string())
}

fn extract_classes(root: &Value) -> Vec<ClassLevel> {
    array(root, &["classes"])
        .iter()
        .map(|class| ClassLevel {
            class_name: str_at(class, &["definition", "name"]).unwrap_or("Unknown").to_string(),
            level: i64_at(class, &["level"])
                .and_then(|level| u32::try_from(level).ok())
                .unwrap_or(0),
            subclass: str_at(class, &["subclassDefinition", "name"]).map(ToString::to_string),
        })
        .collect()
}

fn extract_abilities(root: &Value, warnings: &mut Vec<String>) -> AbilityScores {
    let mut abilities = AbilityScores::default();
    let mut seen = Vec::new();
    for stat in array(root, &["stats"]) {
        let Some(ability) = i64_at(stat, &["id"]).and_then(Ability::from_stat_id) else {
            continue;
        };
        if let Some(score) = i64_at(stat, &["value"]) {
            abilities.get_mut(ability).score = score;
            seen.push(ability);
        }
    }
    for ability in Ability::ALL {
        if !seen.contains(&ability) {
            warnings.push(format!("{} score missing from export; defaulted to 10", ability));
        }
    }
    for ability in save_proficiencies(root) {
        abilities.get_mut(ability).proficient = true;
    }
    abilities
}

pub(super) fn extract_core(root: &Value, user_id: &str, warnings: &mut Vec<String>) -> CharacterCore {
    let classes = extract_classes(root);
    if classes.is_empty() {
        warnings.push("export lists no classes; level set to 0".to_string());
    }
    let level = classes.iter().map(|class| class.level).sum();

    let max_hp = match nonzero_i64_at(root, &["overrideHitPoints"]).or_else(|| i64_at(root, &["baseHitPoints"])) {
        Some(hp) => hp,
        None => {
            warnings.push("hit points missing from export; defaulted to 0".to_string());
            0
        }
    };

    let speed = match nonzero_i64_at(root, &["race", "weightSpeeds", "normal", "walk"]) {
        Some(speed) => speed,
        None => {
            warnings.push("walking speed missing from export; defaulted to 30".to_string());
            30
        }
    };

    CharacterCore {
        user_id: user_id.to_string(),
        name: str_at(root, &["name"]).unwrap_or("Unnamed Character").to_string(),
        level,
        classes,
        species: str_at(root, &["race", "fullName"]).unwrap_or("Unknown").to_string(),
        background: str_at(root, &["background", "definition", "name"]).map(ToString::to_string),
        max_hp,
        speed,
        abilities: extract_abilities(root, warnings),
        spellcasting_ability: primary_class_name(root).and_then(|name| spellcasting_ability(&name)),
    }
}
