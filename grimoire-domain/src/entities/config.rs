use serde::{Deserialize, Serialize};

/// Settings the application layer reads at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub default_user_id: Option<String>,
    pub wiki: WikiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiConfig {
    /// Base URL pages are built from, e.g. `https://dnd2024.wikidot.com`.
    pub primary_base: String,
    pub mirror_host: String,
    /// CORS relay endpoint. `None` fetches pages directly.
    pub relay_url: Option<String>,
    pub relay_param: String,
    pub fallback_delay_ms: u64,
    pub throttle_ms: u64,
}

impl WikiConfig {
    /// Host part of `primary_base`.
    pub fn primary_host(&self) -> &str {
        let without_scheme = self
            .primary_base
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.primary_base);
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            primary_base: "https://dnd2024.wikidot.com".to_string(),
            mirror_host: "dnd5e.wikidot.com".to_string(),
            relay_url: Some("https://api.allorigins.win/raw".to_string()),
            relay_param: "url".to_string(),
            fallback_delay_ms: 1000,
            throttle_ms: 2000,
        }
    }
}

/// Record-store connection. Without a URL the in-memory store is used.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl StoreConfig {
    pub fn is_remote(&self) -> bool {
        self.url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_host_strips_scheme_and_path() {
        let config = WikiConfig::default();
        assert_eq!(config.primary_host(), "dnd2024.wikidot.com");

        let bare = WikiConfig {
            primary_base: "wiki.local/root".to_string(),
            ..WikiConfig::default()
        };
        assert_eq!(bare.primary_host(), "wiki.local");
    }
}
