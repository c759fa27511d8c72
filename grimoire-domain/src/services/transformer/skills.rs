use serde_json::Value;

use super::export::{modifiers, str_at, PROFICIENCY_SOURCES};
use crate::entities::SkillProficiency;
use crate::value_objects::Ability;

pub const SKILLS: [(&str, &str); 18] = [
    ("acrobatics", "Acrobatics"),
    ("animal-handling", "Animal Handling"),
    ("arcana", "Arcana"),
    ("athletics", "Athletics"),
    ("deception", "Deception"),
    ("history", "History"),
    ("insight", "Insight"),
    ("intimidation", "Intimidation"),
    ("investigation", "Investigation"),
    ("medicine", "Medicine"),
    ("nature", "Nature"),
    ("perception", "Perception"),
    ("performance", "Performance"),
    ("persuasion", "Persuasion"),
    ("religion", "Religion"),
    ("sleight-of-hand", "Sleight of Hand"),
    ("stealth", "Stealth"),
    ("survival", "Survival"),
];

fn skill_name(slug: &str) -> Option<&'static str> {
    SKILLS
        .iter()
        .find(|(skill_slug, _)| *skill_slug == slug)
        .map(|(_, name)| *name)
}

pub(super) fn save_proficiencies(root: &Value) -> Vec<Ability> {
    let mut saves = Vec::new();
    for modifier in modifiers(root, &PROFICIENCY_SOURCES) {
        if str_at(modifier, &["type"]) != Some("proficiency") {
            continue;
        }
        let Some(sub_type) = str_at(modifier, &["subType"]) else {
            continue;
        };
        if let Some(ability) = Ability::ALL
            .into_iter()
            .find(|ability| ability.saving_throw_slug() == sub_type)
        {
            if !saves.contains(&ability) {
                saves.push(ability);
            }
        }
    }
    saves
}

/// Proficient skills only, in first-seen order. Expertise implies proficiency.
pub(super) fn extract_skills(root: &Value) -> Vec<SkillProficiency> {
    let mut skills: Vec<SkillProficiency> = Vec::new();
    for modifier in modifiers(root, &PROFICIENCY_SOURCES) {
        let expertise = match str_at(modifier, &["type"]) {
            Some("proficiency") => false,
            Some("expertise") => true,
            _ => continue,
        };
        let Some(name) = str_at(modifier, &["subType"]).and_then(skill_name) else {
            continue;
        };
        match skills.iter_mut().find(|skill| skill.skill_name == name) {
            Some(existing) => existing.expertise |= expertise,
            None => skills.push(SkillProficiency {
                skill_name: name.to_string(),
                expertise,
            }),
        }
    }
    skills
}
