use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use grimoire_domain::RuntimeConfig;

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// Request body as text, inflating it first when sent gzip-encoded.
pub fn read_body(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use grimoire_domain::WikiConfig;
    use std::io::Write;

    fn config(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: token.map(ToString::to_string),
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
            default_user_id: None,
            wiki: WikiConfig::default(),
        }
    }

    #[test]
    fn bearer_token_is_required_only_when_configured() {
        let mut headers = HeaderMap::new();
        assert!(authorize(&config(None), &headers));
        assert!(!authorize(&config(Some("s3cret")), &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer s3cret"));
        assert!(authorize(&config(Some("s3cret")), &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer wrong"));
        assert!(!authorize(&config(Some("s3cret")), &headers));
    }

    #[test]
    fn gzip_bodies_are_inflated() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{\"name\":\"Vex\"}").expect("write");
        let compressed = encoder.finish().expect("finish");
        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        assert_eq!(read_body(&headers, &compressed).expect("inflates"), "{\"name\":\"Vex\"}");
        assert_eq!(read_body(&HeaderMap::new(), b"plain").expect("utf8"), "plain");
    }
}
