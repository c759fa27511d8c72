// One operator's walk through the import workflow

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use grimoire_domain::{ImportStage, SessionId, StatusMessage};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSession {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub stage: ImportStage,
    pub status: Option<StatusMessage>,
    /// Notes from the last save, e.g. references that could not be linked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub save_warnings: Vec<String>,
}

impl ImportSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId(Uuid::new_v4().to_string()),
            created_at: now,
            updated_at: now,
            stage: ImportStage::default(),
            status: None,
            save_warnings: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn report(&mut self, status: StatusMessage) {
        self.status = Some(status);
        self.touch();
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}
