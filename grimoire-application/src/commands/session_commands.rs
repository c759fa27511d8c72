use std::future::Future;

use tracing::{error, info, warn};

use grimoire_domain::{
    parse_export, transform, AsiAction, FlowError, ImportStage, ReferenceKind, ReferenceRecord, ReviewList,
    ReviewStatus, SessionId, StatusMessage,
};

use super::reference_commands::{commit_approved, prepare_imports};
use super::save_commands::{resume_save, save_character, SaveError, SaveOutcome, SavePolicy};
use crate::{AppError, AppState, ImportSession};

/// Owner recorded on a transformed character until the save resolves the real user.
pub const PLACEHOLDER_USER: &str = "unassigned";

/// Runs `apply` against one session under the write lock.
async fn with_session<T, F>(state: &AppState, id: &SessionId, apply: F) -> Result<T, AppError>
where
    F: FnOnce(&mut ImportSession) -> Result<T, AppError>,
{
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(id)
        .ok_or_else(|| AppError::NotFound(format!("import session {}", id)))?;
    let value = apply(session)?;
    session.touch();
    Ok(value)
}

/// Like `with_session`, returning the updated view.
async fn update_session<F>(state: &AppState, id: &SessionId, apply: F) -> Result<ImportSession, AppError>
where
    F: FnOnce(&mut ImportSession) -> Result<(), AppError>,
{
    with_session(state, id, |session| {
        apply(session)?;
        Ok(session.clone())
    })
    .await
}

/// Drives the I/O half of an operation on its own task, so the closing stage
/// transition lands even when the caller stops waiting.
async fn run_to_completion<F>(state: &AppState, id: &SessionId, work: F) -> Result<ImportSession, AppError>
where
    F: Future<Output = Result<ImportSession, AppError>> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(result) => result,
        Err(err) => {
            let message = format!("Import failed: task aborted: {}", err);
            error!("session {}: {}", id, message);
            update_session(state, id, |session| {
                session.stage.fail(message.clone(), None)?;
                session.report(StatusMessage::failure(message));
                Ok(())
            })
            .await
        }
    }
}

/// Fetches an export by D&D Beyond character id, then starts an import with it.
pub async fn start_import_by_id(state: &AppState, character_id: &str) -> Result<ImportSession, AppError> {
    let raw = crate::queries::fetch_beyond_export(state, character_id).await?;
    start_import(state, &raw).await
}

/// Parses and transforms an export, then prepares reference imports for it.
pub async fn start_import(state: &AppState, raw: &str) -> Result<ImportSession, AppError> {
    state.metrics.record_import();
    let export = parse_export(raw).map_err(|err| {
        state.metrics.record_import_error();
        AppError::from(err)
    })?;
    let user_id = state.config.default_user_id.as_deref().unwrap_or(PLACEHOLDER_USER);
    let character = transform(&export, user_id);
    for warning in &character.warnings {
        warn!("{}: {}", character.name(), warning);
    }

    let mut session = ImportSession::new();
    session.stage.submit(character.clone())?;
    let id = session.id.clone();
    info!("import session {} started for \"{}\"", id, character.name());
    state.sessions.write().await.insert(id.clone(), session);

    let task_state = state.clone();
    let task_id = id.clone();
    run_to_completion(state, &id, async move {
        let state = &task_state;
        let prepared = prepare_imports(state, &character).await;
        update_session(state, &task_id, |session| {
            match prepared {
                Ok(board) => {
                    session.stage.prepared(board)?;
                    let status = match session.stage {
                        ImportStage::ReadyToSave { .. } => {
                            StatusMessage::success("No reference data to review. Ready to save character.")
                        }
                        _ => StatusMessage::success("Review reference data before importing."),
                    };
                    session.report(status);
                }
                Err(err) => {
                    state.metrics.record_import_error();
                    let message = format!("Import failed: {}", err);
                    warn!("{}", message);
                    session.stage.fail(message.clone(), None)?;
                    session.report(StatusMessage::failure(message));
                }
            }
            Ok(())
        })
        .await
    })
    .await
}

pub async fn review_entry(
    state: &AppState,
    id: &SessionId,
    kind: ReferenceKind,
    list: ReviewList,
    index: usize,
    status: ReviewStatus,
) -> Result<ImportSession, AppError> {
    update_session(state, id, |session| {
        session
            .stage
            .board_mut()?
            .set_status(kind, list, index, status)
            .map_err(FlowError::from)?;
        Ok(())
    })
    .await
}

/// Replaces a candidate's record. Only allowed while reviewing.
pub async fn edit_candidate(
    state: &AppState,
    id: &SessionId,
    kind: ReferenceKind,
    index: usize,
    record: ReferenceRecord,
) -> Result<ImportSession, AppError> {
    update_session(state, id, |session| {
        session
            .stage
            .board_mut()?
            .edit_candidate(kind, index, record)
            .map_err(FlowError::from)?;
        Ok(())
    })
    .await
}

/// Commits approved candidates once every entry has been resolved.
pub async fn continue_import(state: &AppState, id: &SessionId) -> Result<ImportSession, AppError> {
    let batch = with_session(state, id, |session| Ok(session.stage.begin_commit()?)).await?;
    info!("committing {} approved references for session {}", batch.len(), id);

    let task_state = state.clone();
    let task_id = id.clone();
    run_to_completion(state, id, async move {
        let state = &task_state;
        let report = commit_approved(state, &batch).await;
        update_session(state, &task_id, |session| {
            let failed = report.total_failed();
            session.stage.committed(report)?;
            let status = if failed == 0 {
                StatusMessage::success("Reference data imported. Review character details.")
            } else {
                StatusMessage::warning(format!(
                    "Reference data imported with {} failures. Review character details.",
                    failed
                ))
            };
            session.report(status);
            Ok(())
        })
        .await
    })
    .await
}

pub async fn apply_asi(state: &AppState, id: &SessionId, action: &AsiAction) -> Result<ImportSession, AppError> {
    update_session(state, id, |session| {
        session.stage.apply_asi(action)?;
        Ok(())
    })
    .await
}

pub async fn confirm_character(state: &AppState, id: &SessionId) -> Result<ImportSession, AppError> {
    update_session(state, id, |session| {
        session.stage.confirm_character()?;
        Ok(())
    })
    .await
}

pub async fn save_session(state: &AppState, id: &SessionId) -> Result<ImportSession, AppError> {
    let character = with_session(state, id, |session| Ok(session.stage.begin_persist()?)).await?;
    let task_state = state.clone();
    let task_id = id.clone();
    run_to_completion(state, id, async move {
        let result = save_character(&task_state, &character, SavePolicy::StopOnError).await;
        finish_save(&task_state, &task_id, character.name(), result).await
    })
    .await
}

/// Retries a failed save from the step it stopped at.
pub async fn resume_session(state: &AppState, id: &SessionId) -> Result<ImportSession, AppError> {
    let (character, progress) = with_session(state, id, |session| Ok(session.stage.begin_resume()?)).await?;
    info!(
        "resuming save of \"{}\" at {:?}",
        character.name(),
        progress.failed_step
    );
    let task_state = state.clone();
    let task_id = id.clone();
    run_to_completion(state, id, async move {
        let result = resume_save(&task_state, &character, progress).await;
        finish_save(&task_state, &task_id, character.name(), result).await
    })
    .await
}

async fn finish_save(
    state: &AppState,
    id: &SessionId,
    name: &str,
    result: Result<SaveOutcome, SaveError>,
) -> Result<ImportSession, AppError> {
    state.metrics.record_save(result.is_ok());
    update_session(state, id, |session| {
        match result {
            Ok(outcome) => {
                session.stage.persisted(outcome.character_id)?;
                session.save_warnings = outcome.warnings;
                session.report(StatusMessage::success(format!("Character \"{}\" saved successfully!", name)));
            }
            Err(err) => {
                let message = format!("Save failed: {}", err);
                warn!("{}", message);
                let progress = err.progress().cloned();
                session.stage.fail(message.clone(), progress)?;
                session.report(StatusMessage::failure(message));
            }
        }
        Ok(())
    })
    .await
}

/// Abandons a session awaiting operator input. Nothing already committed is undone.
pub async fn cancel_session(state: &AppState, id: &SessionId) -> Result<ImportSession, AppError> {
    close_session(state, id, ImportStage::cancel).await
}

/// Clears a finished or failed session.
pub async fn reset_session(state: &AppState, id: &SessionId) -> Result<ImportSession, AppError> {
    close_session(state, id, ImportStage::reset).await
}

async fn close_session(
    state: &AppState,
    id: &SessionId,
    transition: fn(&mut ImportStage) -> Result<(), FlowError>,
) -> Result<ImportSession, AppError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(id)
        .ok_or_else(|| AppError::NotFound(format!("import session {}", id)))?;
    transition(&mut session.stage)?;
    session.status = None;
    session.touch();
    let closed = session.clone();
    sessions.remove(id);
    info!("import session {} closed", id);
    Ok(closed)
}
