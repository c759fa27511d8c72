use serde_json::Value;

use super::export::{array, i64_at, str_at, truthy};
use crate::entities::CharacterSpell;

fn spell_level(spell: &Value) -> u8 {
    i64_at(spell, &["definition", "level"])
        .and_then(|level| u8::try_from(level).ok())
        .unwrap_or(0)
}

/// De-duplicated on (name, level). An always-prepared source upgrades an earlier entry.
pub(super) fn extract_spells(root: &Value) -> Vec<CharacterSpell> {
    let mut spells: Vec<CharacterSpell> = Vec::new();
    let mut add = |spell: &Value, always_prepared: bool| {
        let name = str_at(spell, &["definition", "name"]).unwrap_or("Unknown Spell");
        let level = spell_level(spell);
        if let Some(existing) = spells
            .iter_mut()
            .find(|existing| existing.name == name && existing.level == level)
        {
            existing.always_prepared |= always_prepared;
            return;
        }
        spells.push(CharacterSpell {
            name: name.to_string(),
            level,
            is_prepared: truthy(spell, &["prepared"]),
            always_prepared,
        });
    };

    for spell in array(root, &["spells", "class"]) {
        add(spell, false);
    }
    for group in array(root, &["classSpells"]) {
        for spell in array(group, &["spells"]) {
            add(spell, false);
        }
    }
    for spell in array(root, &["spells", "race"]) {
        add(spell, true);
    }
    for spell in array(root, &["spells", "feat"]) {
        add(spell, true);
    }
    spells
}
