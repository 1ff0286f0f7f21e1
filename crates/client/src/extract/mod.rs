//! Profile extraction strategies.
//!
//! Three extractors share the [`ProfileExtractor`] seam and compose
//! independently: site-specific rules (highest trust), generic CSS
//! heuristics, and the AI fallback. The orchestrator runs them in that
//! order and merges their candidate lists.
//!
//! The trait is async because the AI variant awaits network I/O; the
//! other two never suspend.

pub mod ai;
pub mod heuristic;
pub mod site_specific;

pub use ai::AiExtractor;
pub use heuristic::HeuristicExtractor;
pub use site_specific::SiteSpecificExtractor;

use async_trait::async_trait;
use url::Url;

use persona_core::{Error, ExtractionStrategy, Profile};

/// Common capability of all extraction strategies.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// Strategy tag stamped on every profile this extractor produces.
    fn strategy(&self) -> ExtractionStrategy;

    /// Extract candidate profiles from raw markup.
    ///
    /// Implementations return only meaningful profiles (see
    /// [`Profile::is_meaningful`]) and degrade to an empty list rather
    /// than failing on uncooperative markup.
    async fn extract(&self, html: &str, url: &Url) -> Result<Vec<Profile>, Error>;
}

/// Social platform host table shared by the extractors.
const SOCIAL_HOSTS: [(&str, &str); 6] = [
    ("linkedin.com", "linkedin"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("github.com", "github"),
    ("instagram.com", "instagram"),
    ("facebook.com", "facebook"),
];

/// Map an anchor href to a social platform key by host substring.
pub(crate) fn social_platform_for(href: &str) -> Option<&'static str> {
    let host = Url::parse(href).ok()?.host_str()?.to_lowercase();
    SOCIAL_HOSTS
        .iter()
        .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
        .map(|(_, platform)| *platform)
}

/// Resolve a possibly-relative link against the source page URL.
pub(crate) fn absolutize(base: &Url, link: &str) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    base.join(trimmed).ok().map(|u| u.to_string())
}

/// Collapse an element's text runs into one whitespace-normalized string.
pub(crate) fn clean_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
