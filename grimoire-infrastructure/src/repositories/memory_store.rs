// In-process record store, used when no remote store is configured

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use grimoire_domain::{
    AuthSession, AuthUser, CharacterId, CharacterRepository, CharacterRow, ChildRows, ReferenceHandle,
    ReferenceKind, ReferenceRecord, ReferenceRepository, SaveStep,
};

#[derive(Debug, Clone)]
struct StoredReference {
    id: String,
    record: ReferenceRecord,
}

#[derive(Default)]
struct Tables {
    references: HashMap<ReferenceKind, Vec<StoredReference>>,
    characters: Vec<(CharacterId, CharacterRow)>,
    children: HashMap<SaveStep, Vec<Value>>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    user: Option<AuthUser>,
    failing_steps: RwLock<HashSet<SaveStep>>,
    fail_character_insert: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    /// Makes inserts for `step` fail until cleared.
    pub async fn fail_step(&self, step: SaveStep) {
        self.failing_steps.write().await.insert(step);
    }

    pub async fn clear_failures(&self) {
        self.failing_steps.write().await.clear();
        *self.fail_character_insert.write().await = false;
    }

    pub async fn fail_character_inserts(&self) {
        *self.fail_character_insert.write().await = true;
    }

    pub async fn references(&self, kind: ReferenceKind) -> Vec<ReferenceRecord> {
        self.tables
            .read()
            .await
            .references
            .get(&kind)
            .map(|rows| rows.iter().map(|row| row.record.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn characters(&self) -> Vec<(CharacterId, CharacterRow)> {
        self.tables.read().await.characters.clone()
    }

    pub async fn rows(&self, step: SaveStep) -> Vec<Value> {
        self.tables.read().await.children.get(&step).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ReferenceRepository for MemoryStore {
    async fn existing_names(&self, kind: ReferenceKind, names: &[String]) -> Result<HashSet<String>> {
        let tables = self.tables.read().await;
        let stored = tables.references.get(&kind);
        Ok(names
            .iter()
            .filter(|name| {
                stored
                    .map(|rows| rows.iter().any(|row| row.record.name() == name.as_str()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn upsert_reference(&self, record: &ReferenceRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        let rows = tables.references.entry(record.kind()).or_default();
        match rows.iter_mut().find(|row| row.record.name() == record.name()) {
            Some(existing) => existing.record = record.clone(),
            None => rows.push(StoredReference {
                id: Uuid::new_v4().to_string(),
                record: record.clone(),
            }),
        }
        Ok(())
    }

    async fn find_reference(&self, kind: ReferenceKind, name: &str) -> Result<Option<ReferenceHandle>> {
        let tables = self.tables.read().await;
        Ok(tables.references.get(&kind).and_then(|rows| {
            rows.iter().find(|row| row.record.name() == name).map(|row| ReferenceHandle {
                id: row.id.clone(),
                level: match &row.record {
                    ReferenceRecord::Spell(spell) => Some(spell.level),
                    _ => None,
                },
            })
        }))
    }
}

#[async_trait]
impl CharacterRepository for MemoryStore {
    async fn insert_character(&self, row: &CharacterRow) -> Result<CharacterId> {
        if *self.fail_character_insert.read().await {
            return Err(anyhow!("insert into characters rejected"));
        }
        let id = CharacterId(Uuid::new_v4().to_string());
        self.tables.write().await.characters.push((id.clone(), row.clone()));
        Ok(id)
    }

    async fn insert_rows(&self, rows: &ChildRows) -> Result<()> {
        let step = rows.step();
        if self.failing_steps.read().await.contains(&step) {
            return Err(anyhow!("insert into {} rejected", step.table()));
        }
        let values = match rows.to_json()? {
            Value::Array(values) => values,
            other => vec![other],
        };
        self.tables.write().await.children.entry(step).or_default().extend(values);
        Ok(())
    }

    async fn delete_rows(&self, step: SaveStep, character_id: &CharacterId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.children.get_mut(&step) {
            rows.retain(|row| row.get("character_id").and_then(Value::as_str) != Some(character_id.0.as_str()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthSession for MemoryStore {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grimoire_domain::{CurrencyRow, FeatRecord, SkillRow};

    fn feat(name: &str, description: &str) -> ReferenceRecord {
        ReferenceRecord::Feat(FeatRecord {
            name: name.to_string(),
            prerequisites: None,
            description: description.to_string(),
            benefits: None,
        })
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_with_last_values() {
        let store = MemoryStore::new();
        store.upsert_reference(&feat("Alert", "first")).await.expect("insert");
        let first = store
            .find_reference(ReferenceKind::Feat, "Alert")
            .await
            .expect("lookup")
            .expect("found");
        store.upsert_reference(&feat("Alert", "second")).await.expect("update");

        let rows = store.references(ReferenceKind::Feat).await;
        assert_eq!(rows, vec![feat("Alert", "second")]);
        let second = store
            .find_reference(ReferenceKind::Feat, "Alert")
            .await
            .expect("lookup")
            .expect("found");
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn existing_names_is_exact_and_per_kind() {
        let store = MemoryStore::new();
        store.upsert_reference(&feat("Alert", "x")).await.expect("insert");
        let names = vec!["Alert".to_string(), "alert".to_string(), "Lucky".to_string()];
        let found = store.existing_names(ReferenceKind::Feat, &names).await.expect("query");
        assert_eq!(found, HashSet::from(["Alert".to_string()]));
        let spells = store.existing_names(ReferenceKind::Spell, &names).await.expect("query");
        assert!(spells.is_empty());
    }

    #[tokio::test]
    async fn child_rows_delete_by_character() {
        let store = MemoryStore::new();
        let keep = CharacterId("a".to_string());
        let drop = CharacterId("b".to_string());
        for id in [&keep, &drop] {
            store
                .insert_rows(&ChildRows::Skills(vec![SkillRow {
                    character_id: id.clone(),
                    skill_name: "Arcana".to_string(),
                    expertise: false,
                }]))
                .await
                .expect("insert");
        }
        store.delete_rows(SaveStep::Skills, &drop).await.expect("delete");
        let rows = store.rows(SaveStep::Skills).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["character_id"], "a");
    }

    #[tokio::test]
    async fn scripted_failures_reject_inserts() {
        let store = MemoryStore::new();
        store.fail_step(SaveStep::Currency).await;
        let currency = ChildRows::Currency(CurrencyRow {
            character_id: CharacterId("a".to_string()),
            gold: 10,
        });
        assert!(store.insert_rows(&currency).await.is_err());
        store.clear_failures().await;
        store.insert_rows(&currency).await.expect("insert after clear");
        assert_eq!(store.rows(SaveStep::Currency).await.len(), 1);
    }
}
