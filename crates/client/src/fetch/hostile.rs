//! Fallback chain for the designated hostile domain.
//!
//! The direct request almost never works there, so the chain walks an
//! ordered list of approaches:
//!
//! 1. direct fetch with the extended stealth header set
//! 2. a cached-page proxy service
//! 3. a web-archive snapshot (after an availability-index lookup)
//!
//! Attempts are separated by randomized jitter to stay under rate
//! limits, and every response must pass a content-sufficiency check
//! before it is accepted. Rate-limited attempts move on to the next
//! approach. When nothing passes, the chain fails as a whole and the
//! caller treats it as "no content".

use std::time::Duration;

use rand::Rng;
use reqwest::Url;

use persona_core::Error;

use super::{FetchClient, FetchedPage, headers, is_soft_success};

/// Minimum body size for a response to count as a real page.
pub(crate) const MIN_CONTENT_LEN: usize = 1000;

/// Jitter bounds between fallback attempts, in milliseconds.
const JITTER_MIN_MS: u64 = 2_000;
const JITTER_MAX_MS: u64 = 5_000;

/// Class-name fragments and text phrases that indicate real profile
/// markup rather than a login wall or interstitial.
const PROFILE_INDICATORS: [&str; 11] = [
    "pv-text-details",
    "text-heading-xlarge",
    "profile-picture",
    "pv-top-card",
    "experience-section",
    "education-section",
    "experience at",
    "education at",
    "connections",
    "followers",
    "years of experience",
];

/// Content-sufficiency check: a minimum byte length plus at least two
/// profile-indicator hits.
pub(crate) fn has_profile_content(html: &str) -> bool {
    if html.len() < MIN_CONTENT_LEN {
        return false;
    }
    let lower = html.to_lowercase();
    PROFILE_INDICATORS.iter().filter(|marker| lower.contains(*marker)).count() >= 2
}

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(JITTER_MIN_MS..JITTER_MAX_MS))
}

/// Run the fallback chain for a hostile-domain URL.
pub(crate) async fn fetch_hostile(client: &FetchClient, url: &Url) -> Result<FetchedPage, Error> {
    let mut approaches: Vec<(&'static str, String)> = vec![
        ("direct", url.to_string()),
        (
            "cache-proxy",
            format!("https://webcache.googleusercontent.com/search?q=cache:{url}"),
        ),
    ];

    if let Some(snapshot) = client.archive().snapshot_url(url.as_str()).await {
        approaches.push(("web-archive", snapshot));
    }

    for (name, target) in approaches {
        let target_url = match Url::parse(&target) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!(approach = name, error = %e, "skipping unparseable fallback URL");
                continue;
            }
        };

        tokio::time::sleep(jitter()).await;
        tracing::debug!(approach = name, "trying hostile-site approach");

        match client.get_page(&target_url, headers::stealth_headers()).await {
            Ok(page) if page.status == 429 => {
                tracing::warn!(approach = name, "rate limited, moving to next approach");
            }
            Ok(page) if page.status == 200 || is_soft_success(page.status) => {
                if has_profile_content(&page.html) {
                    tracing::debug!(approach = name, "hostile-site approach succeeded");
                    // attribute the markup to the requested URL, not the proxy
                    return Ok(FetchedPage { url: url.clone(), ..page });
                }
                tracing::debug!(approach = name, bytes = page.html.len(), "content check failed");
            }
            Ok(page) => {
                tracing::debug!(approach = name, status = page.status, "unusable status");
            }
            Err(e) => {
                tracing::debug!(approach = name, error = %e, "approach failed");
            }
        }
    }

    Err(Error::AllApproachesFailed(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(body: &str) -> String {
        format!("<html><body>{body}{}</body></html>", "x".repeat(MIN_CONTENT_LEN))
    }

    #[test]
    fn test_short_markup_rejected() {
        assert!(!has_profile_content("<html><div class=\"pv-top-card\">connections</div></html>"));
    }

    #[test]
    fn test_two_indicators_accepted() {
        let html = padded(r#"<div class="pv-top-card"></div><span>500+ connections</span>"#);
        assert!(has_profile_content(&html));
    }

    #[test]
    fn test_one_indicator_rejected() {
        let html = padded(r#"<div class="pv-top-card"></div>"#);
        assert!(!has_profile_content(&html));
    }

    #[test]
    fn test_phrase_indicators_count() {
        let html = padded("10 years of experience. Experience at Example Corp.");
        assert!(has_profile_content(&html));
    }

    #[test]
    fn test_login_wall_rejected() {
        let html = padded("Sign in to continue. Join now to view this page.");
        assert!(!has_profile_content(&html));
    }

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..20 {
            let j = jitter();
            assert!(j >= Duration::from_millis(JITTER_MIN_MS));
            assert!(j < Duration::from_millis(JITTER_MAX_MS));
        }
    }
}
