use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Url;

use crate::services::state::Tab;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const STATUS_HIDE_MS: u64 = 3000;

/// Client settings, resolved once at startup and never written back.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub status_hide_after: Duration,
    pub default_tab: Tab,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: parse_base_url(DEFAULT_BASE_URL).expect("Invalid default base URL"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            status_hide_after: Duration::from_millis(STATUS_HIDE_MS),
            default_tab: Tab::Upload,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, timeout_secs: u64, default_tab: Tab) -> Result<Self> {
        Ok(ClientConfig {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            default_tab,
            ..ClientConfig::default()
        })
    }
}

/// Endpoints are joined relative to the base, so the path must end in `/`.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash).map_err(|e| anyhow!("Invalid base URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("Unsupported URL scheme '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let config = ClientConfig::new("http://localhost:5000/api", 10, Tab::Receipts).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/api/");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.status_hide_after, Duration::from_millis(3000));
        assert_eq!(config.default_tab, Tab::Receipts);
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(ClientConfig::new("not a url", 10, Tab::Upload).is_err());
        assert!(ClientConfig::new("ftp://example.com", 10, Tab::Upload).is_err());
    }

    #[test]
    fn default_points_at_local_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.default_tab, Tab::Upload);
    }
}
