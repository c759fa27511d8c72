// PostgREST-style record store

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use grimoire_domain::{
    CharacterId, CharacterRepository, CharacterRow, ChildRows, ReferenceHandle, ReferenceKind, ReferenceRecord,
    ReferenceRepository, SaveStep, StoreConfig, CHARACTERS_TABLE,
};

#[derive(Debug, Deserialize)]
struct NameRow {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Value,
    #[serde(default)]
    level: Option<u8>,
}

/// Row ids come back as numbers or uuids depending on the table.
fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// `in.(...)` filter with every name double-quoted.
pub fn in_filter(names: &[String]) -> String {
    let quoted: Vec<String> = names
        .iter()
        .map(|name| format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl RestStore {
    pub fn new(client: Client, config: &StoreConfig) -> Result<Self> {
        let base_url = config
            .url
            .clone()
            .ok_or_else(|| anyhow!("store_url is not configured"))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key);
        }
        if let Some(token) = self.access_token.as_ref().or(self.api_key.as_ref()) {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{}", table))
    }

    pub(crate) fn auth_request(&self) -> RequestBuilder {
        self.request(Method::GET, "/auth/v1/user")
    }

    pub(crate) fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }
}

pub(crate) async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("store responded {}: {}", status, body.trim()))
}

#[async_trait]
impl ReferenceRepository for RestStore {
    async fn existing_names(&self, kind: ReferenceKind, names: &[String]) -> Result<HashSet<String>> {
        if names.is_empty() {
            return Ok(HashSet::new());
        }
        let response = self
            .table(Method::GET, kind.table())
            .query(&[("select", "name".to_string()), ("name", in_filter(names))])
            .send()
            .await?;
        let rows: Vec<NameRow> = checked(response).await?.json().await?;
        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    async fn upsert_reference(&self, record: &ReferenceRecord) -> Result<()> {
        let table = record.kind().table();
        debug!("upserting {} into {}", record.name(), table);
        let response = self
            .table(Method::POST, table)
            .query(&[("on_conflict", "name")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[record.to_value()?])
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }

    async fn find_reference(&self, kind: ReferenceKind, name: &str) -> Result<Option<ReferenceHandle>> {
        let select = match kind {
            ReferenceKind::Spell => "id,level",
            ReferenceKind::MagicItem | ReferenceKind::Feat => "id",
        };
        let response = self
            .table(Method::GET, kind.table())
            .query(&[
                ("select", select.to_string()),
                ("name", format!("eq.{}", name)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<IdRow> = checked(response).await?.json().await?;
        Ok(rows.into_iter().next().and_then(|row| {
            id_string(&row.id).map(|id| ReferenceHandle { id, level: row.level })
        }))
    }
}

#[async_trait]
impl CharacterRepository for RestStore {
    async fn insert_character(&self, row: &CharacterRow) -> Result<CharacterId> {
        let response = self
            .table(Method::POST, CHARACTERS_TABLE)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let rows: Vec<IdRow> = checked(response).await?.json().await?;
        rows.first()
            .and_then(|row| id_string(&row.id))
            .map(CharacterId)
            .ok_or_else(|| anyhow!("character insert returned no id"))
    }

    async fn insert_rows(&self, rows: &ChildRows) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let response = self
            .table(Method::POST, rows.step().table())
            .json(&rows.to_json()?)
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }

    async fn delete_rows(&self, step: SaveStep, character_id: &CharacterId) -> Result<()> {
        let response = self
            .table(Method::DELETE, step.table())
            .query(&[("character_id", format!("eq.{}", character_id))])
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }
}
