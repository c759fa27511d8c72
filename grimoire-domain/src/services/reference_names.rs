// Names a character refers to in the reference tables

use serde::Serialize;

use crate::entities::TransformedCharacter;
use crate::value_objects::ReferenceKind;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReferenceNames {
    pub spells: Vec<String>,
    pub items: Vec<String>,
    pub feats: Vec<String>,
}

impl ReferenceNames {
    pub fn get(&self, kind: ReferenceKind) -> &[String] {
        match kind {
            ReferenceKind::Spell => &self.spells,
            ReferenceKind::MagicItem => &self.items,
            ReferenceKind::Feat => &self.feats,
        }
    }

    pub fn total(&self) -> usize {
        self.spells.len() + self.items.len() + self.feats.len()
    }
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|seen| seen == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Distinct spell, magic item and feat names in first-seen order.
pub fn extract_reference_names(character: &TransformedCharacter) -> ReferenceNames {
    ReferenceNames {
        spells: distinct(character.spells.iter().map(|spell| spell.name.as_str())),
        items: distinct(character.magic_items().map(|item| item.name.as_str())),
        feats: distinct(character.feats.iter().map(|feat| feat.name.as_str())),
    }
}
