use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use grimoire_domain::WikiConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// One HTTP GET of a wiki page. The fetcher layers fallback and sniffing on top.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PageResponse>;
}

/// Fetches through a CORS relay that takes the target URL as a query parameter.
pub struct RelayTransport {
    client: Client,
    relay_url: Option<String>,
    relay_param: String,
}

impl RelayTransport {
    pub fn new(client: Client, config: &WikiConfig) -> Self {
        Self {
            client,
            relay_url: config.relay_url.clone(),
            relay_param: config.relay_param.clone(),
        }
    }

    pub fn with_timeout(config: &WikiConfig, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(3)))
            .build()?;
        Ok(Self::new(client, config))
    }
}

#[async_trait]
impl PageTransport for RelayTransport {
    async fn get(&self, url: &str) -> Result<PageResponse> {
        let request = match &self.relay_url {
            Some(relay) => self.client.get(relay).query(&[(self.relay_param.as_str(), url)]),
            None => self.client.get(url),
        };
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(PageResponse { status, body })
    }
}
