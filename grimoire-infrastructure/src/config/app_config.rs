use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use grimoire_domain::{RuntimeConfig, StoreConfig, WikiConfig};

use super::validation::{validate_host, validate_http_url};
use crate::services::DEFAULT_CHARACTER_SERVICE;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub default_user_id: Option<String>,
    pub log_dir: Option<String>,
    pub wiki_primary_base: String,
    pub wiki_mirror_host: String,
    pub wiki_relay_url: Option<String>,
    pub wiki_relay_param: String,
    pub wiki_fallback_delay_ms: u64,
    pub wiki_throttle_ms: u64,
    pub store_url: Option<String>,
    pub store_api_key: Option<String>,
    pub store_access_token: Option<String>,
    pub character_service_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let wiki = WikiConfig::default();
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 15,
            default_user_id: None,
            log_dir: None,
            wiki_primary_base: wiki.primary_base,
            wiki_mirror_host: wiki.mirror_host,
            wiki_relay_url: wiki.relay_url,
            wiki_relay_param: wiki.relay_param,
            wiki_fallback_delay_ms: wiki.fallback_delay_ms,
            wiki_throttle_ms: wiki.throttle_ms,
            store_url: None,
            store_api_key: None,
            store_access_token: None,
            character_service_url: DEFAULT_CHARACTER_SERVICE.to_string(),
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("GRIMOIRE_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        for value in [
            &mut self.api_token,
            &mut self.default_user_id,
            &mut self.log_dir,
            &mut self.wiki_relay_url,
            &mut self.store_url,
            &mut self.store_api_key,
            &mut self.store_access_token,
        ] {
            if value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(false) {
                *value = None;
            }
        }
        self.wiki_primary_base = self.wiki_primary_base.trim().trim_end_matches('/').to_string();
        self.wiki_mirror_host = self.wiki_mirror_host.trim().to_string();
        self.character_service_url = self.character_service_url.trim().trim_end_matches('/').to_string();
        if let Some(url) = &self.store_url {
            self.store_url = Some(url.trim().trim_end_matches('/').to_string());
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        validate_http_url("wiki_primary_base", &self.wiki_primary_base)?;
        validate_host("wiki_mirror_host", &self.wiki_mirror_host)?;
        if let Some(relay) = &self.wiki_relay_url {
            validate_http_url("wiki_relay_url", relay)?;
            if self.wiki_relay_param.trim().is_empty() {
                return Err(anyhow!("wiki_relay_param must not be empty when a relay is set"));
            }
        }
        if let Some(url) = &self.store_url {
            validate_http_url("store_url", url)?;
        }
        validate_http_url("character_service_url", &self.character_service_url)?;
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            default_user_id: self.default_user_id.clone(),
            wiki: WikiConfig {
                primary_base: self.wiki_primary_base.clone(),
                mirror_host: self.wiki_mirror_host.clone(),
                relay_url: self.wiki_relay_url.clone(),
                relay_param: self.wiki_relay_param.clone(),
                fallback_delay_ms: self.wiki_fallback_delay_ms,
                throttle_ms: self.wiki_throttle_ms,
            },
        }
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            url: self.store_url.clone(),
            api_key: self.store_api_key.clone(),
            access_token: self.store_access_token.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("GRIMOIRE_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("GRIMOIRE_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("GRIMOIRE_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("GRIMOIRE_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("GRIMOIRE_DEFAULT_USER_ID") {
            self.default_user_id = Some(value);
        }
        if let Ok(value) = env::var("GRIMOIRE_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Ok(value) = env::var("GRIMOIRE_WIKI_PRIMARY_BASE") {
            self.wiki_primary_base = value;
        }
        if let Ok(value) = env::var("GRIMOIRE_WIKI_MIRROR_HOST") {
            self.wiki_mirror_host = value;
        }
        if let Ok(value) = env::var("GRIMOIRE_WIKI_RELAY_URL") {
            self.wiki_relay_url = Some(value);
        }
        if let Ok(value) = env::var("GRIMOIRE_WIKI_RELAY_PARAM") {
            self.wiki_relay_param = value;
        }
        if let Ok(value) = env::var("GRIMOIRE_WIKI_FALLBACK_DELAY_MS") {
            self.wiki_fallback_delay_ms = value.parse().unwrap_or(self.wiki_fallback_delay_ms);
        }
        if let Ok(value) = env::var("GRIMOIRE_WIKI_THROTTLE_MS") {
            self.wiki_throttle_ms = value.parse().unwrap_or(self.wiki_throttle_ms);
        }
        if let Ok(value) = env::var("GRIMOIRE_STORE_URL") {
            self.store_url = Some(value);
        }
        if let Ok(value) = env::var("GRIMOIRE_STORE_API_KEY") {
            self.store_api_key = Some(value);
        }
        if let Ok(value) = env::var("GRIMOIRE_STORE_ACCESS_TOKEN") {
            self.store_access_token = Some(value);
        }
        if let Ok(value) = env::var("GRIMOIRE_CHARACTER_SERVICE_URL") {
            self.character_service_url = value;
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_point_at_the_public_wiki() {
        let config = AppConfig::default();
        config.validate().expect("defaults validate");
        let runtime = config.to_runtime_config();
        assert_eq!(runtime.wiki, WikiConfig::default());
        assert!(!config.to_store_config().is_remote());
    }

    #[test]
    fn blank_optionals_normalize_to_none() {
        let mut config = AppConfig {
            api_token: Some("  ".to_string()),
            wiki_relay_url: Some(String::new()),
            store_url: Some("https://db.example.com/".to_string()),
            wiki_primary_base: "https://wiki.example.com/".to_string(),
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.api_token, None);
        assert_eq!(config.wiki_relay_url, None);
        assert_eq!(config.store_url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.wiki_primary_base, "https://wiki.example.com");
        config.validate().expect("still valid");
    }

    #[test]
    fn rejects_bad_addresses_and_hosts() {
        let bad_bind = AppConfig {
            bind_addr: "nowhere".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_bind.validate().is_err());

        let bad_mirror = AppConfig {
            wiki_mirror_host: "https://dnd5e.wikidot.com".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_mirror.validate().is_err());

        let bad_service = AppConfig {
            character_service_url: "character-service".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_service.validate().is_err());

        let bad_store = AppConfig {
            store_url: Some("ftp://db".to_string()),
            ..AppConfig::default()
        };
        assert!(bad_store.validate().is_err());
    }

    #[test]
    fn relative_log_dir_resolves_against_config_dir() {
        let mut config = AppConfig {
            log_dir: Some("logs".to_string()),
            ..AppConfig::default()
        };
        config.resolve_paths(Some(Path::new("/etc/grimoire")));
        assert_eq!(config.log_dir.as_deref(), Some("/etc/grimoire/logs"));
    }
}
