use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use grimoire_domain::ExportSource;

pub const DEFAULT_CHARACTER_SERVICE: &str = "https://character-service.dndbeyond.com/character/v5/character";

/// Pulls public character exports from the D&D Beyond character service.
pub struct BeyondExportClient {
    client: Client,
    base_url: String,
}

impl BeyondExportClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn export_url(&self, character_id: &str) -> String {
        format!("{}/{}", self.base_url, character_id.trim())
    }
}

#[async_trait]
impl ExportSource for BeyondExportClient {
    async fn fetch_export(&self, character_id: &str) -> Result<String> {
        let url = self.export_url(character_id);
        info!("fetching character export from {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("character service responded {} for {}", status, url));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_url_appends_the_character_id() {
        let client = BeyondExportClient::new(Client::new(), &format!("{}/", DEFAULT_CHARACTER_SERVICE));
        assert_eq!(
            client.export_url(" 12345 "),
            "https://character-service.dndbeyond.com/character/v5/character/12345"
        );
    }
}
