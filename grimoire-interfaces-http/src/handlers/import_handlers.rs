use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use grimoire_application::commands::session_commands;
use grimoire_application::queries::{preview_queries, session_queries};
use grimoire_application::{AppState, ImportSession};
use grimoire_domain::{
    AsiAction, AsiGroup, AsiGroupRef, ReferenceKind, ReferenceRecord, ReviewList, ReviewStatus, SessionId,
};

use crate::error::HttpError;
use crate::middleware::{authorize, read_body};

#[derive(Deserialize)]
pub struct EditAsiPayload {
    pub previous: AsiGroupRef,
    pub group: AsiGroup,
}

fn check(state: &AppState, headers: &HeaderMap) -> Result<(), HttpError> {
    if !authorize(&state.config, headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(())
}

fn parse_kind(value: &str) -> Result<ReferenceKind, HttpError> {
    value.parse().map_err(HttpError::BadRequest)
}

fn parse_action(value: &str) -> Result<ReviewStatus, HttpError> {
    match value {
        "approve" => Ok(ReviewStatus::Approved),
        "skip" => Ok(ReviewStatus::Skipped),
        other => Err(HttpError::BadRequest(format!("unknown review action '{}'", other))),
    }
}

fn export_text(headers: &HeaderMap, body: &[u8]) -> Result<String, HttpError> {
    read_body(headers, body).map_err(|err| {
        error!("failed to read import body: {}", err);
        HttpError::BadRequest(err.to_string())
    })
}

/// A create body of the form `{"character_id": 123}` asks for a D&D Beyond fetch
/// instead of carrying the export itself.
fn requested_character_id(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    match object.get("character_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

pub async fn create_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let raw = export_text(&headers, &body)?;
    let session = match requested_character_id(&raw) {
        Some(character_id) => session_commands::start_import_by_id(&state, &character_id).await?,
        None => session_commands::start_import(&state, &raw).await?,
    };
    Ok(Json(session))
}

pub async fn preview_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<preview_queries::ImportPreview>, HttpError> {
    check(&state, &headers)?;
    let raw = export_text(&headers, &body)?;
    let preview = preview_queries::preview_import(&state, &raw)?;
    Ok(Json(preview))
}

pub async fn list_imports(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ImportSession>>, HttpError> {
    check(&state, &headers)?;
    Ok(Json(session_queries::list_sessions(&state).await))
}

pub async fn get_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_queries::get_session(&state, &SessionId(id)).await?;
    Ok(Json(session))
}

pub async fn review_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, kind, list, index, action)): Path<(String, String, String, usize, String)>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let kind = parse_kind(&kind)?;
    let list: ReviewList = list.parse().map_err(HttpError::BadRequest)?;
    let status = parse_action(&action)?;
    let session = session_commands::review_entry(&state, &SessionId(id), kind, list, index, status).await?;
    Ok(Json(session))
}

/// Only candidates carry editable data.
pub async fn edit_candidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, kind, list, index)): Path<(String, String, String, usize)>,
    Json(payload): Json<Value>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let kind = parse_kind(&kind)?;
    let list: ReviewList = list.parse().map_err(HttpError::BadRequest)?;
    if list != ReviewList::Candidates {
        return Err(HttpError::BadRequest("only candidates can be edited".to_string()));
    }
    let record = ReferenceRecord::from_value(kind, payload).map_err(|err| HttpError::BadRequest(err.to_string()))?;
    let session = session_commands::edit_candidate(&state, &SessionId(id), kind, index, record).await?;
    Ok(Json(session))
}

pub async fn continue_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::continue_import(&state, &SessionId(id)).await?;
    Ok(Json(session))
}

pub async fn add_asi(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(group): Json<AsiGroup>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::apply_asi(&state, &SessionId(id), &AsiAction::Add(group)).await?;
    Ok(Json(session))
}

pub async fn edit_asi(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<EditAsiPayload>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let action = AsiAction::Edit {
        previous: payload.previous,
        group: payload.group,
    };
    let session = session_commands::apply_asi(&state, &SessionId(id), &action).await?;
    Ok(Json(session))
}

pub async fn remove_asi(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(target): Json<AsiGroupRef>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::apply_asi(&state, &SessionId(id), &AsiAction::Remove(target)).await?;
    Ok(Json(session))
}

pub async fn confirm_character(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::confirm_character(&state, &SessionId(id)).await?;
    Ok(Json(session))
}

pub async fn save_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::save_session(&state, &SessionId(id)).await?;
    Ok(Json(session))
}

pub async fn resume_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::resume_session(&state, &SessionId(id)).await?;
    Ok(Json(session))
}

pub async fn cancel_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::cancel_session(&state, &SessionId(id)).await?;
    Ok(Json(session))
}

pub async fn reset_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, HttpError> {
    check(&state, &headers)?;
    let session = session_commands::reset_session(&state, &SessionId(id)).await?;
    Ok(Json(session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_bucket_or_wiki_names() {
        assert_eq!(parse_kind("spells").ok(), Some(ReferenceKind::Spell));
        assert_eq!(parse_kind("items").ok(), Some(ReferenceKind::MagicItem));
        assert_eq!(parse_kind("magic-item").ok(), Some(ReferenceKind::MagicItem));
        assert_eq!(parse_kind("Feat").ok(), Some(ReferenceKind::Feat));
        assert!(parse_kind("monsters").is_err());
        assert!(parse_action("approve").is_ok());
        assert!(parse_action("delete").is_err());
    }

    #[test]
    fn only_a_lone_character_id_selects_a_fetch() {
        assert_eq!(requested_character_id("{\"character_id\": 4711}").as_deref(), Some("4711"));
        assert_eq!(requested_character_id("{\"character_id\": \"4711\"}").as_deref(), Some("4711"));
        assert_eq!(requested_character_id("{\"character_id\": 4711, \"name\": \"Vex\"}"), None);
        assert_eq!(requested_character_id("{\"data\": {\"name\": \"Vex\"}}"), None);
        assert_eq!(requested_character_id("not json"), None);
    }
}
