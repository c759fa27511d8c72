use crate::{AppError, AppState, ImportSession};
use grimoire_domain::SessionId;

pub async fn get_session(state: &AppState, id: &SessionId) -> Result<ImportSession, AppError> {
    state
        .sessions
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("import session {}", id)))
}

/// Open sessions, most recently touched first.
pub async fn list_sessions(state: &AppState) -> Vec<ImportSession> {
    let mut sessions: Vec<ImportSession> = state.sessions.read().await.values().cloned().collect();
    sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sessions
}
