//! Web-archive snapshot lookup.
//!
//! Last link of the hostile-site fallback chain: ask the archive's
//! availability index whether a snapshot of the page exists, and if so
//! fetch that snapshot instead of the live page.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://archive.org/wayback/available?url=<url>`
//! - **Response**: snapshot URL at `archived_snapshots.closest.url`,
//!   gated on `archived_snapshots.closest.available`.
//! - The lookup is advisory: every failure collapses to "no snapshot".

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use persona_core::Error;

/// Default base URL for the availability index.
const DEFAULT_BASE_URL: &str = "https://archive.org/wayback";

/// Default lookup timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Archive lookup configuration.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Base URL of the availability-check endpoint.
    pub base_url: String,
    /// Lookup timeout.
    pub timeout: Duration,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: DEFAULT_TIMEOUT }
    }
}

/// Raw availability-index response.
#[derive(Debug, Default, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    #[serde(default)]
    closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Default, Deserialize)]
struct ClosestSnapshot {
    #[serde(default)]
    available: bool,
    #[serde(default)]
    url: Option<String>,
}

/// Client for the web-archive availability index.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: Client,
    config: ArchiveConfig,
}

impl ArchiveClient {
    /// Create a new archive client with the given configuration.
    pub fn new(config: ArchiveConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build archive client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Look up the closest archived snapshot URL for a page.
    ///
    /// Returns `None` when no usable snapshot exists or the lookup fails
    /// in any way.
    pub async fn snapshot_url(&self, url: &str) -> Option<String> {
        let endpoint = format!("{}/available", self.config.base_url);

        let response = match self.http.get(&endpoint).query(&[("url", url)]).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "archive availability lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "archive availability lookup rejected");
            return None;
        }

        let body: AvailabilityResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(error = %e, "archive availability response unreadable");
                return None;
            }
        };

        snapshot_from(body)
    }
}

/// Pull a usable snapshot URL out of the availability response.
fn snapshot_from(body: AvailabilityResponse) -> Option<String> {
    let closest = body.archived_snapshots.closest?;
    if !closest.available {
        return None;
    }
    closest.url.filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_available() {
        let body: AvailabilityResponse = serde_json::from_str(
            r#"{
                "archived_snapshots": {
                    "closest": {
                        "available": true,
                        "url": "http://web.archive.org/web/20240101000000/https://example.com",
                        "timestamp": "20240101000000",
                        "status": "200"
                    }
                }
            }"#,
        )
        .unwrap();

        let url = snapshot_from(body).unwrap();
        assert!(url.contains("web.archive.org"));
    }

    #[test]
    fn test_snapshot_from_unavailable() {
        let body: AvailabilityResponse = serde_json::from_str(
            r#"{"archived_snapshots": {"closest": {"available": false, "url": "http://web.archive.org/x"}}}"#,
        )
        .unwrap();
        assert!(snapshot_from(body).is_none());
    }

    #[test]
    fn test_snapshot_from_empty_index() {
        let body: AvailabilityResponse = serde_json::from_str(r#"{"archived_snapshots": {}}"#).unwrap();
        assert!(snapshot_from(body).is_none());

        let body: AvailabilityResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(snapshot_from(body).is_none());
    }

    #[test]
    fn test_snapshot_from_available_without_url() {
        let body: AvailabilityResponse =
            serde_json::from_str(r#"{"archived_snapshots": {"closest": {"available": true}}}"#).unwrap();
        assert!(snapshot_from(body).is_none());
    }

    #[test]
    fn test_default_config() {
        let config = ArchiveConfig::default();
        assert_eq!(config.base_url, "https://archive.org/wayback");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
