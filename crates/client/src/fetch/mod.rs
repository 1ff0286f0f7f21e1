//! HTTP fetch pipeline with anti-blocking fallbacks.
//!
//! ### Status Policy
//!
//! - 200 is a success.
//! - 401/403/429 are soft successes: many sites serve partial content
//!   behind these codes, so the body is returned anyway.
//! - 404 is a hard failure.
//! - Every other status returns the body too; the extractors decide
//!   whether anything useful is in it.
//!
//! ### Hostile Targets
//!
//! URLs on the designated hostile domain go through an ordered fallback
//! chain (see [`hostile`]) instead of a single direct request.

pub mod archive;
pub mod headers;
pub mod hostile;
pub mod url;

pub use archive::{ArchiveClient, ArchiveConfig};
pub use url::{UrlError, canonicalize, is_hostile};

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode, Url};

use persona_core::Error;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Page fetch timeout (default: 30s).
    pub timeout: Duration,

    /// Timeout for the lightweight validate probe (default: 10s).
    pub validate_timeout: Duration,

    /// Maximum number of redirects to follow (default: 10).
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            validate_timeout: Duration::from_secs(10),
            max_redirects: 10,
        }
    }
}

/// Raw markup fetched for a URL.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub url: Url,
    /// The final URL after redirects.
    pub final_url: Url,
    /// HTTP status code of the response the body came from.
    pub status: u16,
    /// Response body.
    pub html: String,
    /// Time taken to fetch in milliseconds.
    pub fetch_ms: u64,
}

/// HTTP fetch client with browser-imitating headers and hostile-site
/// fallbacks.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
    archive: ArchiveClient,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build HTTP client: {e}")))?;

        let archive = ArchiveClient::new(ArchiveConfig::default())?;

        Ok(Self { http, config, archive })
    }

    /// Fetch raw markup for a URL.
    ///
    /// Hostile-domain URLs are routed through the fallback chain; all
    /// others get one direct request with rotated browser headers.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, Error> {
        if is_hostile(url) {
            return hostile::fetch_hostile(self, url).await;
        }

        let page = self
            .get_page(url, headers::browser_headers(headers::random_user_agent()))
            .await?;

        if page.status != 200 && !is_soft_success(page.status) {
            tracing::warn!(status = page.status, url = %url, "non-success status, using body anyway");
        }

        Ok(page)
    }

    /// Advisory reachability probe.
    ///
    /// True when the URL answers 200 with an HTML/text content-type or a
    /// soft-success code; false on 404 or an unreachable host. Any other
    /// status defaults to true so anti-bot gateways don't produce false
    /// negatives.
    pub async fn validate(&self, url: &str) -> bool {
        let url = match canonicalize(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!(error = %e, "validate: unusable URL");
                return false;
            }
        };

        let request = self
            .http
            .get(url.as_str())
            .headers(headers::browser_headers(headers::random_user_agent()))
            .timeout(self.config.validate_timeout);

        match request.send().await {
            Ok(response) => {
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                validate_status(response.status().as_u16(), content_type.as_deref())
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %url, "validate probe failed");
                false
            }
        }
    }

    /// Issue one GET and return the body regardless of status, failing
    /// only on 404 and transport errors.
    pub(crate) async fn get_page(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<FetchedPage, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .headers(headers)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.to_string()));
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| Error::FetchFailed(format!("failed to read body: {e}")))?;

        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(url = %url, status = status.as_u16(), bytes = html.len(), fetch_ms, "fetched page");

        Ok(FetchedPage { url: url.clone(), final_url, status: status.as_u16(), html, fetch_ms })
    }

    /// The archive-lookup client used by the fallback chain.
    pub(crate) fn archive(&self) -> &ArchiveClient {
        &self.archive
    }
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::Timeout } else { Error::FetchFailed(err.to_string()) }
}

/// Statuses that still tend to carry usable page content.
pub(crate) fn is_soft_success(status: u16) -> bool {
    matches!(status, 401 | 403 | 429)
}

/// Status classification for the validate probe.
fn validate_status(status: u16, content_type: Option<&str>) -> bool {
    match status {
        200 => content_type
            .map(|ct| {
                let ct = ct.to_lowercase();
                ct.contains("html") || ct.contains("text")
            })
            .unwrap_or(false),
        404 => false,
        s if is_soft_success(s) => true,
        _ => true,
    }
}
