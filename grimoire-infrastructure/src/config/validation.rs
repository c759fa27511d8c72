use anyhow::{anyhow, Result};
use reqwest::Url;

pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value.trim()).map_err(|err| anyhow!("invalid {}: {}", field, err))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("{} must be an http(s) URL", field));
    }
    if url.host_str().is_none() {
        return Err(anyhow!("{} has no host", field));
    }
    Ok(())
}

pub fn validate_host(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} is empty", field));
    }
    if trimmed.contains("://") || trimmed.contains('/') {
        return Err(anyhow!("{} must be a bare host name", field));
    }
    Ok(())
}
