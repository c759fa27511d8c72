use async_trait::async_trait;
use std::collections::HashSet;

use crate::entities::{ChildRows, CharacterRow, ReferenceHandle, ReferenceRecord, SaveStep};
use crate::value_objects::{CharacterId, ReferenceKind};

#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Which of `names` already exist in the kind's table (exact match on `name`).
    async fn existing_names(&self, kind: ReferenceKind, names: &[String]) -> anyhow::Result<HashSet<String>>;

    /// Insert or overwrite the row keyed on `name`.
    async fn upsert_reference(&self, record: &ReferenceRecord) -> anyhow::Result<()>;

    async fn find_reference(&self, kind: ReferenceKind, name: &str) -> anyhow::Result<Option<ReferenceHandle>>;
}

#[async_trait]
pub trait CharacterRepository: Send + Sync {
    async fn insert_character(&self, row: &CharacterRow) -> anyhow::Result<CharacterId>;
    async fn insert_rows(&self, rows: &ChildRows) -> anyhow::Result<()>;
    async fn delete_rows(&self, step: SaveStep, character_id: &CharacterId) -> anyhow::Result<()>;
}
