// D&D Beyond export -> relational character graph

mod class_specific;
mod core_stats;
mod export;
mod feats;
mod features;
mod improvements;
mod inventory;
mod senses;
mod skills;
mod spells;

use serde_json::Value;
use tracing::debug;

use crate::entities::TransformedCharacter;
use crate::error::ExportError;

pub use self::core_stats::spellcasting_ability;
pub use self::skills::SKILLS;

/// `componentTypeId` the export uses for feats granted by a background.
pub const BACKGROUND_COMPONENT_TYPE: i64 = 12168134;

/// The API envelope `{ "data": {...} }` or the bare character object.
pub fn unwrap_export(export: &Value) -> &Value {
    match export.get("data") {
        Some(data) if data.is_object() => data,
        _ => export,
    }
}

/// Rejects input that cannot be an export before any session state exists.
pub fn parse_export(text: &str) -> Result<Value, ExportError> {
    if text.trim().is_empty() {
        return Err(ExportError::Empty);
    }
    let value: Value = serde_json::from_str(text).map_err(|err| ExportError::Malformed(err.to_string()))?;
    if !unwrap_export(&value).is_object() {
        return Err(ExportError::NotAnObject);
    }
    Ok(value)
}

/// Never fails. Every default applied to missing data is recorded in `warnings`.
pub fn transform(export: &Value, user_id: &str) -> TransformedCharacter {
    let root = unwrap_export(export);
    let mut warnings = Vec::new();
    let character = core_stats::extract_core(root, user_id, &mut warnings);
    let ability_score_improvements = improvements::extract_improvements(root, &mut warnings);

    let transformed = TransformedCharacter {
        character,
        skills: skills::extract_skills(root),
        spells: spells::extract_spells(root),
        features: features::extract_features(root),
        feats: feats::extract_feats(root),
        ability_score_improvements,
        inventory: inventory::extract_inventory(root),
        currency: inventory::extract_currency(root),
        senses: senses::extract_senses(root),
        class_specific: class_specific::extract_class_specific(root),
        warnings,
    };
    debug!(
        name = %transformed.character.name,
        spells = transformed.spells.len(),
        feats = transformed.feats.len(),
        warnings = transformed.warnings.len(),
        "transformed export"
    );
    transformed
}

pub fn proficiency_bonus(level: u32) -> i64 {
    (i64::from(level) + 3) / 4 + 1
}

pub fn ability_modifier(score: i64) -> i64 {
    (score - 10).div_euclid(2)
}
