use serde::Serialize;

use grimoire_domain::{
    extract_reference_names, parse_export, transform, ReferenceNames, TransformedCharacter,
};

use crate::commands::PLACEHOLDER_USER;
use crate::{AppError, AppState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub character: TransformedCharacter,
    pub reference_names: ReferenceNames,
}

/// Transforms an export without touching the store or the wiki.
pub fn preview_import(state: &AppState, raw: &str) -> Result<ImportPreview, AppError> {
    let export = parse_export(raw)?;
    let user_id = state.config.default_user_id.as_deref().unwrap_or(PLACEHOLDER_USER);
    let character = transform(&export, user_id);
    let reference_names = extract_reference_names(&character);
    Ok(ImportPreview {
        character,
        reference_names,
    })
}
