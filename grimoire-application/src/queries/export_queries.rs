use anyhow::Context;
use tracing::warn;

use crate::{AppError, AppState};

/// Fetches a raw export by D&D Beyond character id. Ids are numeric.
pub async fn fetch_beyond_export(state: &AppState, character_id: &str) -> Result<String, AppError> {
    let character_id = character_id.trim();
    if character_id.is_empty() || !character_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!(
            "invalid D&D Beyond character id '{}'",
            character_id
        )));
    }
    let raw = state
        .exports
        .fetch_export(character_id)
        .await
        .with_context(|| format!("failed to fetch character {} from D&D Beyond", character_id))
        .map_err(|err| {
            warn!("{:#}", err);
            state.metrics.record_import_error();
            AppError::from(err)
        })?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_state, ScriptedScraper, StubExports};
    use std::sync::Arc;

    #[tokio::test]
    async fn numeric_ids_are_fetched_and_others_rejected_upfront() {
        let exports = Arc::new(StubExports::default().with("4711", "{\"data\": {\"name\": \"Orin\"}}"));
        let (mut state, _) = test_state(Arc::new(ScriptedScraper::default()));
        state.exports = exports.clone();

        let raw = fetch_beyond_export(&state, " 4711 ").await.expect("fetches");
        assert!(raw.contains("Orin"));

        assert!(matches!(
            fetch_beyond_export(&state, "../4711").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(fetch_beyond_export(&state, "99").await, Err(AppError::Internal(_))));
        assert_eq!(exports.requested(), vec!["4711", "99"]);
    }
}
