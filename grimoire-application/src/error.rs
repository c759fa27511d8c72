use thiserror::Error;

use grimoire_domain::{AsiError, ExportError, FlowError, ReviewError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::InvalidTransition { .. } | FlowError::ReviewNotReady { .. } => {
                AppError::Conflict(err.to_string())
            }
            FlowError::Review(ReviewError::IndexOutOfRange { .. })
            | FlowError::Asi(AsiError::UnknownGroup(_)) => AppError::NotFound(err.to_string()),
            FlowError::Review(_) | FlowError::Asi(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grimoire_domain::ReferenceKind;

    #[test]
    fn flow_errors_map_to_request_outcomes() {
        assert!(matches!(
            AppError::from(FlowError::invalid("review", "save")),
            AppError::Conflict(message) if message == "cannot save while review"
        ));
        assert!(matches!(
            AppError::from(FlowError::Review(ReviewError::IndexOutOfRange {
                kind: ReferenceKind::Spell,
                list: "candidates",
                index: 4,
            })),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(FlowError::Asi(AsiError::EmptyGroup)),
            AppError::BadRequest(_)
        ));
        assert!(matches!(AppError::from(ExportError::Empty), AppError::BadRequest(_)));
    }
}
