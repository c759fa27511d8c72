// One-shot commands: import a file straight into the store, or preview it

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tokio::fs;
use tracing::{info, warn};

use grimoire_application::commands::{commit_approved, prepare_imports, save_character, SavePolicy};
use grimoire_application::queries::{fetch_beyond_export, preview_import};
use grimoire_application::AppState;
use grimoire_domain::{ReferenceKind, ReviewBoard, ReviewList, ReviewStatus, SaveStep};

/// Where an export comes from.
#[derive(Debug, Clone)]
pub enum ExportInput {
    File(PathBuf),
    /// A D&D Beyond character id, fetched from the character service.
    Beyond(String),
}

impl std::fmt::Display for ExportInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportInput::File(path) => write!(f, "{}", path.display()),
            ExportInput::Beyond(id) => write!(f, "D&D Beyond character {}", id),
        }
    }
}

async fn read_export(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn load_export(state: &AppState, input: &ExportInput) -> Result<String> {
    match input {
        ExportInput::File(path) => read_export(path).await,
        ExportInput::Beyond(character_id) => Ok(fetch_beyond_export(state, character_id).await?),
    }
}

/// Prints the transformed character and the reference names it needs.
pub async fn preview(state: &AppState, path: &Path) -> Result<()> {
    let raw = read_export(path).await?;
    let preview = preview_import(state, &raw)?;
    println!("{}", serde_json::to_string_pretty(&preview.character)?);
    let character = &preview.character.character;
    let classes = character
        .classes
        .iter()
        .map(|class| format!("{} {}", class.class_name, class.level))
        .collect::<Vec<_>>()
        .join(" / ");
    info!(
        "{}: level {} {} ({}), {} spells, {} magic items, {} feats to resolve",
        character.name,
        character.level,
        character.species,
        classes,
        preview.reference_names.spells.len(),
        preview.reference_names.items.len(),
        preview.reference_names.feats.len()
    );
    for warning in &preview.character.warnings {
        warn!("{}", warning);
    }
    Ok(())
}

fn approve_all(board: &mut ReviewBoard) {
    for kind in ReferenceKind::ALL {
        let count = board.bucket(kind).candidates.len();
        for index in 0..count {
            if let Err(err) = board.set_status(kind, ReviewList::Candidates, index, ReviewStatus::Approved) {
                warn!("could not approve {} #{}: {}", kind.label(), index, err);
            }
        }
    }
}

/// Transforms, optionally auto-imports missing references, then saves best effort.
/// Fails only when the core character row cannot be written.
pub async fn import(state: &AppState, input: &ExportInput, auto_approve: bool) -> Result<()> {
    let raw = load_export(state, input).await?;
    let preview = preview_import(state, &raw)?;
    let character = preview.character;
    info!("importing \"{}\" from {}", character.name(), input);

    if auto_approve {
        let mut board = prepare_imports(state, &character).await?;
        for kind in ReferenceKind::ALL {
            let bucket = board.bucket(kind);
            for failed in &bucket.failed {
                warn!("{} \"{}\" not imported: {}", kind.label(), failed.name, failed.error);
            }
        }
        approve_all(&mut board);
        let report = commit_approved(state, &board.approved_batch()).await;
        info!(
            "auto-imported {} references, {} failed",
            report.total_inserted(),
            report.total_failed()
        );
    }

    match save_character(state, &character, SavePolicy::ContinueOnError).await {
        Ok(outcome) => {
            for step in SaveStep::ALL {
                if let Some(failure) = outcome.failures.iter().find(|failure| failure.step == step) {
                    warn!("{}: {}", step, failure.error);
                } else {
                    info!("{}: ok", step);
                }
            }
            for warning in &outcome.warnings {
                warn!("{}", warning);
            }
            info!(
                "character \"{}\" saved with id {}",
                character.name(),
                outcome.character_id
            );
            Ok(())
        }
        Err(err) => Err(anyhow!("failed to import \"{}\": {}", character.name(), err)),
    }
}
