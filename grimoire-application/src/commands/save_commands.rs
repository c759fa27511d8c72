use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use grimoire_domain::{
    CharacterId, CharacterRow, ChildRows, ClassSpecificRow, CurrencyRow, FeatLinkRow, FeatureRow, InventoryRow,
    ReferenceKind, SaveProgress, SaveStep, SenseRow, SkillRow, SpellLinkRow, TransformedCharacter, UserId,
};

use crate::AppState;

/// What to do when a child collection fails to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePolicy {
    /// Stop and keep a resumable progress record.
    StopOnError,
    /// Log the failure and move on to the next collection.
    ContinueOnError,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("No authenticated user found. Please log in first.")]
    NotAuthenticated,
    #[error("could not resolve the signed-in user: {0}")]
    Auth(#[source] anyhow::Error),
    #[error("could not build the character row: {0}")]
    Row(#[from] serde_json::Error),
    #[error("failed to insert character: {0}")]
    Core(#[source] anyhow::Error),
    #[error("failed to save {step}: {source}")]
    Step {
        step: SaveStep,
        source: anyhow::Error,
        progress: SaveProgress,
    },
}

impl SaveError {
    /// Progress to resume from. Only set once the core row exists.
    pub fn progress(&self) -> Option<&SaveProgress> {
        match self {
            SaveError::Step { progress, .. } => Some(progress),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: SaveStep,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub character_id: CharacterId,
    pub progress: SaveProgress,
    /// Child collections that failed under `ContinueOnError`.
    pub failures: Vec<StepFailure>,
    pub warnings: Vec<String>,
}

async fn resolve_user(state: &AppState) -> Result<UserId, SaveError> {
    if let Some(user) = state.auth.current_user().await.map_err(SaveError::Auth)? {
        return Ok(user.id);
    }
    state
        .config
        .default_user_id
        .clone()
        .map(UserId)
        .ok_or(SaveError::NotAuthenticated)
}

/// Writes the core row, then each child collection in order. Not transactional.
pub async fn save_character(
    state: &AppState,
    character: &TransformedCharacter,
    policy: SavePolicy,
) -> Result<SaveOutcome, SaveError> {
    let user_id = resolve_user(state).await?;
    let row = CharacterRow::from_character(character, &user_id.0)?;
    let character_id = state
        .character_repo
        .insert_character(&row)
        .await
        .map_err(SaveError::Core)?;
    info!("character \"{}\" created with id {}", character.name(), character_id);
    run_steps(state, character, SaveProgress::new(character_id), policy).await
}

/// Continues an interrupted save against the existing character id. The failed
/// step's rows are cleared first; completed steps are not repeated.
pub async fn resume_save(
    state: &AppState,
    character: &TransformedCharacter,
    progress: SaveProgress,
) -> Result<SaveOutcome, SaveError> {
    if let Some(step) = progress.failed_step {
        info!("clearing {} for character {} before retry", step, progress.character_id);
        if let Err(err) = state.character_repo.delete_rows(step, &progress.character_id).await {
            return Err(SaveError::Step {
                step,
                source: err,
                progress,
            });
        }
    }
    run_steps(state, character, progress, SavePolicy::StopOnError).await
}

async fn run_steps(
    state: &AppState,
    character: &TransformedCharacter,
    mut progress: SaveProgress,
    policy: SavePolicy,
) -> Result<SaveOutcome, SaveError> {
    let mut warnings = Vec::new();
    let mut failures = Vec::new();
    for step in progress.remaining() {
        let result = match child_rows(state, character, step, &progress.character_id, &mut warnings).await {
            Ok(Some(rows)) => {
                let count = rows.len();
                state.character_repo.insert_rows(&rows).await.map(|_| count)
            }
            Ok(None) => Ok(0),
            Err(err) => Err(err),
        };
        match result {
            Ok(count) => {
                info!("{} rows written to {}", count, step);
                progress.completed.push(step);
                if progress.failed_step == Some(step) {
                    progress.failed_step = None;
                }
            }
            Err(err) => match policy {
                SavePolicy::StopOnError => {
                    warn!("save stopped at {}: {}", step, err);
                    progress.failed_step = Some(step);
                    return Err(SaveError::Step {
                        step,
                        source: err,
                        progress,
                    });
                }
                SavePolicy::ContinueOnError => {
                    warn!("failed to write {}: {}", step, err);
                    failures.push(StepFailure {
                        step,
                        error: err.to_string(),
                    });
                }
            },
        }
    }
    Ok(SaveOutcome {
        character_id: progress.character_id.clone(),
        progress,
        failures,
        warnings,
    })
}

/// Rows for one step. `None` when the step has nothing to write.
async fn child_rows(
    state: &AppState,
    character: &TransformedCharacter,
    step: SaveStep,
    character_id: &CharacterId,
    warnings: &mut Vec<String>,
) -> anyhow::Result<Option<ChildRows>> {
    let repo = &state.reference_repo;
    let rows = match step {
        SaveStep::Skills => ChildRows::Skills(
            character
                .skills
                .iter()
                .map(|skill| SkillRow {
                    character_id: character_id.clone(),
                    skill_name: skill.skill_name.clone(),
                    expertise: skill.expertise,
                })
                .collect(),
        ),
        SaveStep::Spells => {
            let mut rows = Vec::new();
            for spell in &character.spells {
                let Some(handle) = repo.find_reference(ReferenceKind::Spell, &spell.name).await? else {
                    skipped(warnings, format!("Spell \"{}\" not found in spells table", spell.name));
                    continue;
                };
                let cantrip = handle.level.unwrap_or(spell.level) == 0;
                rows.push(SpellLinkRow {
                    character_id: character_id.clone(),
                    spell_id: handle.id,
                    is_prepared: cantrip || spell.is_prepared,
                    always_prepared: spell.always_prepared,
                });
            }
            ChildRows::Spells(rows)
        }
        SaveStep::Features => ChildRows::Features(
            character
                .features
                .iter()
                .map(|feature| FeatureRow {
                    character_id: character_id.clone(),
                    name: feature.name.clone(),
                    source: feature.source.as_str().to_string(),
                    description: feature.description.clone(),
                    max_uses: feature.max_uses,
                    reset_on: feature.reset_on.map(|reset| reset.as_str().to_string()),
                })
                .collect(),
        ),
        SaveStep::Feats => {
            let mut rows = Vec::new();
            for feat in &character.feats {
                let Some(handle) = repo.find_reference(ReferenceKind::Feat, &feat.name).await? else {
                    skipped(warnings, format!("Feat \"{}\" not found in feats table", feat.name));
                    continue;
                };
                rows.push(FeatLinkRow {
                    character_id: character_id.clone(),
                    feat_id: handle.id,
                    source: feat.source.as_str().to_string(),
                    choices: feat.choices.clone(),
                });
            }
            ChildRows::Feats(rows)
        }
        SaveStep::Inventory => {
            let mut rows = Vec::new();
            for item in &character.inventory {
                let (magic_item_id, mundane_item_name) = if item.is_magic_item {
                    match repo.find_reference(ReferenceKind::MagicItem, &item.name).await? {
                        Some(handle) => (Some(handle.id), None),
                        None => {
                            skipped(
                                warnings,
                                format!("Skipping magic item \"{}\" - not found in database", item.name),
                            );
                            continue;
                        }
                    }
                } else {
                    (None, Some(item.name.clone()))
                };
                rows.push(InventoryRow {
                    character_id: character_id.clone(),
                    magic_item_id,
                    mundane_item_name,
                    quantity: item.quantity.max(1),
                    equipped: item.equipped,
                    attuned: item.attuned,
                    notes: item.notes.clone(),
                });
            }
            ChildRows::Inventory(rows)
        }
        SaveStep::Currency => ChildRows::Currency(CurrencyRow {
            character_id: character_id.clone(),
            gold: character.currency.gold,
        }),
        SaveStep::Senses => ChildRows::Senses(
            character
                .senses
                .iter()
                .map(|sense| SenseRow {
                    character_id: character_id.clone(),
                    sense_type: sense.sense_type.as_str().to_string(),
                    range: sense.range,
                    notes: sense.notes.clone(),
                })
                .collect(),
        ),
        SaveStep::ClassSpecific => {
            if character.class_specific.is_empty() {
                return Ok(None);
            }
            ChildRows::ClassSpecific(ClassSpecificRow {
                character_id: character_id.clone(),
                data: character.class_specific.clone(),
            })
        }
    };
    Ok((!rows.is_empty()).then_some(rows))
}

fn skipped(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spell_record, test_state, wizard_character, ScriptedScraper};
    use grimoire_domain::{ReferenceRecord, ReferenceRepository};
    use std::sync::Arc;

    #[tokio::test]
    async fn saves_core_and_children_linking_known_references() {
        let (state, store) = test_state(Arc::new(ScriptedScraper::default()));
        store
            .upsert_reference(&ReferenceRecord::Spell(spell_record("Fire Bolt", 0)))
            .await
            .expect("seed");

        let character = wizard_character();
        let outcome = save_character(&state, &character, SavePolicy::StopOnError)
            .await
            .expect("saves");

        let characters = store.characters().await;
        assert_eq!(characters.len(), 1);
        assert_eq!(characters[0].0, outcome.character_id);
        assert_eq!(characters[0].1.user_id, "tester");
        assert_eq!(characters[0].1.intelligence, 18);

        let spells = store.rows(SaveStep::Spells).await;
        assert_eq!(spells.len(), 1);
        assert_eq!(spells[0]["is_prepared"], true);
        assert!(outcome
            .warnings
            .iter()
            .any(|warning| warning == "Spell \"Magic Missile\" not found in spells table"));
        assert_eq!(store.rows(SaveStep::Currency).await.len(), 1);
        assert_eq!(outcome.progress.completed.len(), SaveStep::ALL.len());
    }

    #[tokio::test]
    async fn core_insert_failure_writes_nothing() {
        let (state, store) = test_state(Arc::new(ScriptedScraper::default()));
        store.fail_character_inserts().await;
        let err = save_character(&state, &wizard_character(), SavePolicy::ContinueOnError)
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Core(_)));
        assert!(err.progress().is_none());
        assert!(store.rows(SaveStep::Skills).await.is_empty());
    }

    #[tokio::test]
    async fn missing_user_is_a_hard_failure() {
        let (mut state, store) = test_state(Arc::new(ScriptedScraper::default()));
        state.auth = Arc::new(grimoire_infrastructure::MemoryStore::new());
        let err = save_character(&state, &wizard_character(), SavePolicy::StopOnError)
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::NotAuthenticated));
        assert!(store.characters().await.is_empty());
    }

    #[tokio::test]
    async fn continue_policy_skips_past_child_failures() {
        let (state, store) = test_state(Arc::new(ScriptedScraper::default()));
        store.fail_step(SaveStep::Features).await;
        let outcome = save_character(&state, &wizard_character(), SavePolicy::ContinueOnError)
            .await
            .expect("best effort");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].step, SaveStep::Features);
        assert!(!outcome.progress.is_completed(SaveStep::Features));
        assert!(outcome.progress.is_completed(SaveStep::Senses));
        assert_eq!(store.rows(SaveStep::Currency).await.len(), 1);
    }

    #[tokio::test]
    async fn resume_skips_completed_steps_and_reruns_the_failed_one_once() {
        let (state, store) = test_state(Arc::new(ScriptedScraper::default()));
        store.fail_step(SaveStep::Inventory).await;
        let character = wizard_character();
        let err = save_character(&state, &character, SavePolicy::StopOnError)
            .await
            .unwrap_err();
        let progress = err.progress().cloned().expect("resumable");
        assert_eq!(progress.failed_step, Some(SaveStep::Inventory));
        assert_eq!(
            progress.completed,
            vec![SaveStep::Skills, SaveStep::Spells, SaveStep::Features, SaveStep::Feats]
        );
        let skills_before = store.rows(SaveStep::Skills).await.len();

        store.clear_failures().await;
        let outcome = resume_save(&state, &character, progress.clone())
            .await
            .expect("resumes");
        assert_eq!(outcome.character_id, progress.character_id);
        assert_eq!(outcome.progress.failed_step, None);
        assert_eq!(store.rows(SaveStep::Skills).await.len(), skills_before);
        assert_eq!(store.rows(SaveStep::Inventory).await.len(), character.inventory.len());
        assert_eq!(store.characters().await.len(), 1);
    }
}
