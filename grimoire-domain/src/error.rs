// Typed domain errors

use thiserror::Error;

use crate::value_objects::{Ability, ReferenceKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{} record is missing a name", .0.label())]
    MissingName(ReferenceKind),
    #[error("Cannot parse {} \"{}\": missing or invalid description", .kind.label(), .name)]
    MissingDescription { kind: ReferenceKind, name: String },
    #[error("Cannot parse spell \"{name}\": invalid level {level} (must be 0-9)")]
    LevelOutOfRange { name: String, level: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("no {list} entry at index {index} in the {kind} bucket")]
    IndexOutOfRange {
        kind: ReferenceKind,
        list: &'static str,
        index: usize,
    },
    #[error("\"{name}\" is already {status}")]
    AlreadyResolved { name: String, status: &'static str },
    #[error("expected {expected} data, got {actual}")]
    KindMismatch {
        expected: ReferenceKind,
        actual: ReferenceKind,
    },
    #[error(transparent)]
    Invalid(#[from] RecordError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsiError {
    #[error("an ability score improvement group needs at least one ability")]
    EmptyGroup,
    #[error("an ability score improvement group needs a source")]
    EmptySource,
    #[error("{ability} amount {amount} is outside 1-3")]
    AmountOutOfRange { ability: Ability, amount: u8 },
    #[error("no ability score improvement group '{0}'")]
    UnknownGroup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("cannot {action} while {stage}")]
    InvalidTransition {
        stage: &'static str,
        action: &'static str,
    },
    #[error("{unresolved} review entries are still pending")]
    ReviewNotReady { unresolved: usize },
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Asi(#[from] AsiError),
}

impl FlowError {
    pub fn invalid(stage: &'static str, action: &'static str) -> Self {
        FlowError::InvalidTransition { stage, action }
    }
}

/// Fetch or parse failure for one reference name. Carries every URL tried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScrapeFailure {
    pub message: String,
    pub attempted_urls: Vec<String>,
}

impl ScrapeFailure {
    pub fn new(message: impl Into<String>, attempted_urls: Vec<String>) -> Self {
        Self {
            message: message.into(),
            attempted_urls,
        }
    }

    pub fn source_url(&self) -> String {
        self.attempted_urls.join(" → ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("export is empty")]
    Empty,
    #[error("export is not valid JSON: {0}")]
    Malformed(String),
    #[error("export must be a JSON object")]
    NotAnObject,
}
