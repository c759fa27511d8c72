// Import session state machine
//
// awaiting-input -> preparing -> {review | ready-to-save} -> committing-references
//   -> character-review -> ready-to-save -> persisting -> done
// Each I/O stage may move to failed. Transitions leave the stage untouched on error.

use serde::Serialize;

use crate::entities::asi::{apply_asi_action, AsiAction};
use crate::entities::character::TransformedCharacter;
use crate::entities::persistence::SaveProgress;
use crate::entities::review::{ApprovedBatch, CommitReport, ReviewBoard};
use crate::error::FlowError;
use crate::value_objects::CharacterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Warning,
    Failure,
}

/// Operator-facing status line, prefixed by its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub outcome: Outcome,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Warning,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.outcome {
            Outcome::Success => "success",
            Outcome::Warning => "warning",
            Outcome::Failure => "failure",
        };
        write!(f, "{}: {}", prefix, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "stage", rename_all = "kebab-case")]
pub enum ImportStage {
    #[default]
    AwaitingInput,
    Preparing {
        character: TransformedCharacter,
    },
    Review {
        character: TransformedCharacter,
        board: ReviewBoard,
    },
    CommittingReferences {
        character: TransformedCharacter,
        board: ReviewBoard,
    },
    CharacterReview {
        character: TransformedCharacter,
        report: CommitReport,
    },
    ReadyToSave {
        character: TransformedCharacter,
        report: Option<CommitReport>,
    },
    Persisting {
        character: TransformedCharacter,
        resume: Option<SaveProgress>,
    },
    Done {
        character_id: CharacterId,
        name: String,
    },
    Failed {
        message: String,
        character: Option<TransformedCharacter>,
        progress: Option<SaveProgress>,
    },
}

impl ImportStage {
    pub fn name(&self) -> &'static str {
        match self {
            ImportStage::AwaitingInput => "awaiting-input",
            ImportStage::Preparing { .. } => "preparing",
            ImportStage::Review { .. } => "review",
            ImportStage::CommittingReferences { .. } => "committing-references",
            ImportStage::CharacterReview { .. } => "character-review",
            ImportStage::ReadyToSave { .. } => "ready-to-save",
            ImportStage::Persisting { .. } => "persisting",
            ImportStage::Done { .. } => "done",
            ImportStage::Failed { .. } => "failed",
        }
    }

    /// Stages with an outstanding I/O operation. Operator actions are rejected here.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ImportStage::Preparing { .. }
                | ImportStage::CommittingReferences { .. }
                | ImportStage::Persisting { .. }
        )
    }

    pub fn character(&self) -> Option<&TransformedCharacter> {
        match self {
            ImportStage::Preparing { character }
            | ImportStage::Review { character, .. }
            | ImportStage::CommittingReferences { character, .. }
            | ImportStage::CharacterReview { character, .. }
            | ImportStage::ReadyToSave { character, .. }
            | ImportStage::Persisting { character, .. } => Some(character),
            ImportStage::Failed { character, .. } => character.as_ref(),
            ImportStage::AwaitingInput | ImportStage::Done { .. } => None,
        }
    }

    pub fn board(&self) -> Option<&ReviewBoard> {
        match self {
            ImportStage::Review { board, .. } | ImportStage::CommittingReferences { board, .. } => {
                Some(board)
            }
            _ => None,
        }
    }

    fn reject(&mut self, previous: ImportStage, action: &'static str) -> FlowError {
        let err = FlowError::invalid(previous.name(), action);
        *self = previous;
        err
    }

    pub fn submit(&mut self, character: TransformedCharacter) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::AwaitingInput => {
                *self = ImportStage::Preparing { character };
                Ok(())
            }
            other => Err(self.reject(other, "submit an export")),
        }
    }

    /// With nothing to review the session skips straight to ready-to-save.
    pub fn prepared(&mut self, board: ReviewBoard) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::Preparing { character } => {
                *self = if board.entries_to_review() == 0 {
                    ImportStage::ReadyToSave {
                        character,
                        report: None,
                    }
                } else {
                    ImportStage::Review { character, board }
                };
                Ok(())
            }
            other => Err(self.reject(other, "finish preparing")),
        }
    }

    pub fn board_mut(&mut self) -> Result<&mut ReviewBoard, FlowError> {
        match self {
            ImportStage::Review { board, .. } => Ok(board),
            other => Err(FlowError::invalid(other.name(), "review references")),
        }
    }

    pub fn begin_commit(&mut self) -> Result<ApprovedBatch, FlowError> {
        match std::mem::take(self) {
            ImportStage::Review { character, board } => {
                if !board.review_ready() {
                    let unresolved = board.unresolved();
                    *self = ImportStage::Review { character, board };
                    return Err(FlowError::ReviewNotReady { unresolved });
                }
                let batch = board.approved_batch();
                *self = ImportStage::CommittingReferences { character, board };
                Ok(batch)
            }
            other => Err(self.reject(other, "continue")),
        }
    }

    pub fn committed(&mut self, report: CommitReport) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::CommittingReferences { character, .. } => {
                *self = ImportStage::CharacterReview { character, report };
                Ok(())
            }
            other => Err(self.reject(other, "finish committing references")),
        }
    }

    pub fn apply_asi(&mut self, action: &AsiAction) -> Result<(), FlowError> {
        let character = match self {
            ImportStage::CharacterReview { character, .. } | ImportStage::ReadyToSave { character, .. } => {
                character
            }
            other => return Err(FlowError::invalid(other.name(), "edit ability score improvements")),
        };
        let next = apply_asi_action(&character.ability_score_improvements, action)?;
        character.ability_score_improvements = next;
        Ok(())
    }

    pub fn confirm_character(&mut self) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::CharacterReview { character, report } => {
                *self = ImportStage::ReadyToSave {
                    character,
                    report: Some(report),
                };
                Ok(())
            }
            other => Err(self.reject(other, "confirm the character")),
        }
    }

    pub fn begin_persist(&mut self) -> Result<TransformedCharacter, FlowError> {
        match std::mem::take(self) {
            ImportStage::ReadyToSave { character, .. } => {
                *self = ImportStage::Persisting {
                    character: character.clone(),
                    resume: None,
                };
                Ok(character)
            }
            other => Err(self.reject(other, "save")),
        }
    }

    pub fn begin_resume(&mut self) -> Result<(TransformedCharacter, SaveProgress), FlowError> {
        match std::mem::take(self) {
            ImportStage::Failed {
                character: Some(character),
                progress: Some(progress),
                ..
            } => {
                *self = ImportStage::Persisting {
                    character: character.clone(),
                    resume: Some(progress.clone()),
                };
                Ok((character, progress))
            }
            other => Err(self.reject(other, "resume a save")),
        }
    }

    pub fn persisted(&mut self, character_id: CharacterId) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::Persisting { character, .. } => {
                *self = ImportStage::Done {
                    character_id,
                    name: character.character.name,
                };
                Ok(())
            }
            other => Err(self.reject(other, "finish saving")),
        }
    }

    /// Only in-flight stages fail. A character still in memory is kept for resume.
    pub fn fail(&mut self, message: impl Into<String>, progress: Option<SaveProgress>) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::Preparing { character }
            | ImportStage::CommittingReferences { character, .. }
            | ImportStage::Persisting { character, .. } => {
                *self = ImportStage::Failed {
                    message: message.into(),
                    character: Some(character),
                    progress,
                };
                Ok(())
            }
            other => Err(self.reject(other, "record a failure")),
        }
    }

    pub fn cancel(&mut self) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::Review { .. } | ImportStage::CharacterReview { .. } | ImportStage::ReadyToSave { .. } => {
                Ok(())
            }
            other => Err(self.reject(other, "cancel")),
        }
    }

    pub fn reset(&mut self) -> Result<(), FlowError> {
        match std::mem::take(self) {
            ImportStage::Done { .. } | ImportStage::Failed { .. } => Ok(()),
            other => Err(self.reject(other, "reset")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::asi::{AbilityGrant, AsiGroup, AsiSourceType};
    use crate::entities::character::{AbilityScores, CharacterCore, Currency};
    use crate::entities::persistence::SaveStep;
    use crate::entities::reference::{ReferenceRecord, SpellRecord};
    use crate::entities::review::{ReviewEntry, ReviewList, ReviewStatus};
    use crate::value_objects::{Ability, ReferenceKind};
    use serde_json::Map;

    fn character() -> TransformedCharacter {
        TransformedCharacter {
            character: CharacterCore {
                user_id: "user-1".to_string(),
                name: "Elara".to_string(),
                level: 1,
                classes: Vec::new(),
                species: "Elf".to_string(),
                background: None,
                max_hp: 8,
                speed: 30,
                abilities: AbilityScores::default(),
                spellcasting_ability: None,
            },
            skills: Vec::new(),
            spells: Vec::new(),
            features: Vec::new(),
            feats: Vec::new(),
            ability_score_improvements: Vec::new(),
            inventory: Vec::new(),
            currency: Currency::default(),
            senses: Vec::new(),
            class_specific: Map::new(),
            warnings: Vec::new(),
        }
    }

    fn board_with_candidate() -> ReviewBoard {
        let mut board = ReviewBoard::default();
        board.spells.candidates.push(ReviewEntry::new(
            ReferenceRecord::Spell(SpellRecord {
                name: "Light".to_string(),
                level: 0,
                school: None,
                casting_time: None,
                range: None,
                components: None,
                duration: None,
                description: "Glow.".to_string(),
                higher_levels: None,
            }),
            "https://dnd2024.wikidot.com/spell:light",
        ));
        board
    }

    #[test]
    fn empty_board_skips_review() {
        let mut stage = ImportStage::default();
        stage.submit(character()).expect("submit");
        stage.prepared(ReviewBoard::default()).expect("prepared");
        assert_eq!(stage.name(), "ready-to-save");
    }

    #[test]
    fn continue_requires_review_stage_and_complete_review() {
        let mut stage = ImportStage::default();
        assert_eq!(
            stage.begin_commit(),
            Err(FlowError::invalid("awaiting-input", "continue"))
        );
        assert_eq!(stage.name(), "awaiting-input");

        stage.submit(character()).expect("submit");
        stage.prepared(board_with_candidate()).expect("prepared");
        assert_eq!(stage.begin_commit(), Err(FlowError::ReviewNotReady { unresolved: 1 }));
        assert_eq!(stage.name(), "review");

        stage
            .board_mut()
            .expect("board")
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 0, ReviewStatus::Approved)
            .expect("approve");
        let batch = stage.begin_commit().expect("commit");
        assert_eq!(batch.spells.len(), 1);
        assert!(stage.is_in_flight());
    }

    #[test]
    fn save_is_rejected_during_review() {
        let mut stage = ImportStage::default();
        stage.submit(character()).expect("submit");
        stage.prepared(board_with_candidate()).expect("prepared");
        assert!(matches!(
            stage.begin_persist(),
            Err(FlowError::InvalidTransition { stage: "review", .. })
        ));
        assert!(stage.board().is_some());
    }

    #[test]
    fn asi_edits_apply_in_character_review_only() {
        let action = AsiAction::Add(AsiGroup {
            source: "Sage".to_string(),
            source_type: AsiSourceType::Background,
            abilities: vec![AbilityGrant {
                ability: Ability::Wisdom,
                amount: 1,
            }],
        });
        let mut stage = ImportStage::Review {
            character: character(),
            board: board_with_candidate(),
        };
        assert!(stage.apply_asi(&action).is_err());

        let mut stage = ImportStage::CharacterReview {
            character: character(),
            report: CommitReport::default(),
        };
        stage.apply_asi(&action).expect("add group");
        stage.confirm_character().expect("confirm");
        let saved = stage.begin_persist().expect("persist");
        assert_eq!(saved.ability_score_improvements.len(), 1);
    }

    #[test]
    fn failed_save_can_resume_then_reset() {
        let mut stage = ImportStage::ReadyToSave {
            character: character(),
            report: None,
        };
        stage.begin_persist().expect("persist");
        let mut progress = SaveProgress::new(CharacterId("c-1".to_string()));
        progress.completed.push(SaveStep::Skills);
        stage.fail("failure: spells insert failed", Some(progress)).expect("fail");
        assert_eq!(stage.name(), "failed");

        let (_, progress) = stage.begin_resume().expect("resume");
        assert!(progress.is_completed(SaveStep::Skills));
        stage.persisted(progress.character_id.clone()).expect("done");
        assert_eq!(stage.name(), "done");
        assert!(stage.cancel().is_err());
        stage.reset().expect("reset");
        assert_eq!(stage, ImportStage::AwaitingInput);
    }

    #[test]
    fn status_messages_carry_outcome_prefix() {
        assert_eq!(StatusMessage::warning("2 spells skipped").to_string(), "warning: 2 spells skipped");
    }
}
