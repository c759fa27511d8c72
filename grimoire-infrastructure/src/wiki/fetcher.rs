use std::sync::Arc;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use grimoire_domain::{ScrapeFailure, WikiConfig};

use super::transport::PageTransport;

const NOT_FOUND_MARKERS: [&str; 6] = [
    "The page does not (yet) exist",
    "This page does not exist yet",
    "This page does not yet exist",
    "This page does not exist",
    "page does not exist yet",
    "page does not yet exist",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    pub attempted_urls: Vec<String>,
}

pub fn is_missing_page(html: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|marker| html.contains(marker))
}

fn looks_unusual(html: &str) -> bool {
    html.len() < 500 && !html.contains("<!DOCTYPE") && !html.contains("<html")
}

pub struct WikiFetcher {
    transport: Arc<dyn PageTransport>,
    primary_host: String,
    mirror_host: String,
    fallback_delay: Duration,
}

impl WikiFetcher {
    pub fn new(transport: Arc<dyn PageTransport>, config: &WikiConfig) -> Self {
        Self {
            transport,
            primary_host: config.primary_host().to_string(),
            mirror_host: config.mirror_host.clone(),
            fallback_delay: Duration::from_millis(config.fallback_delay_ms),
        }
    }

    /// Same path on the mirror host, when `url` points at the primary host.
    fn mirror_url(&self, url: &str) -> Option<String> {
        let mut parsed = Url::parse(url).ok()?;
        if parsed.host_str() != Some(self.primary_host.as_str()) {
            return None;
        }
        parsed.set_host(Some(&self.mirror_host)).ok()?;
        Some(parsed.to_string())
    }

    async fn try_fetch(&self, url: &str) -> Result<String, String> {
        debug!("fetching {}", url);
        let response = self.transport.get(url).await.map_err(|err| err.to_string())?;
        if response.status == 429 {
            return Err(format!("Rate limited (429) at {}", url));
        }
        if !(200..300).contains(&response.status) {
            let reason = StatusCode::from_u16(response.status)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("unexpected status");
            return Err(format!("Failed to fetch: {} {}", response.status, reason));
        }
        if is_missing_page(&response.body) {
            return Err("Wikidot page not found".to_string());
        }
        if looks_unusual(&response.body) {
            let snippet: String = response.body.chars().take(200).collect();
            warn!("short non-document response from {}: {}", url, snippet);
        }
        Ok(response.body)
    }

    /// One attempt, plus one retry on the mirror host for primary-host URLs.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeFailure> {
        let mut attempted_urls = vec![url.to_string()];
        let first_error = match self.try_fetch(url).await {
            Ok(html) => return Ok(FetchedPage { html, attempted_urls }),
            Err(err) => err,
        };

        let Some(fallback) = self.mirror_url(url) else {
            info!("fetch failed without fallback: {}", first_error);
            return Err(ScrapeFailure::new(first_error, attempted_urls));
        };

        info!("{}; retrying on {} after {:?}", first_error, self.mirror_host, self.fallback_delay);
        tokio::time::sleep(self.fallback_delay).await;
        attempted_urls.push(fallback.clone());
        match self.try_fetch(&fallback).await {
            Ok(html) => Ok(FetchedPage { html, attempted_urls }),
            Err(err) => {
                let message = format!("Failed after trying: {}", attempted_urls.join(" → "));
                info!("{} ({})", message, err);
                Err(ScrapeFailure::new(message, attempted_urls))
            }
        }
    }
}
