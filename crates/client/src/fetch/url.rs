//! URL canonicalization and host classification for the fetch pipeline.
//!
//! The canonical form is what the cache is keyed on, so the rules here
//! decide when two request URLs count as the same page.

use url::Url;

/// Domain that requires the anti-blocking fallback chain.
pub const HOSTILE_DOMAIN: &str = "linkedin.com";

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for fetching and cache keying.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
///
/// Only http and https URLs are accepted; the host is lowercased by the
/// parser itself.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme =
        if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = Url::parse(&with_scheme).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::InvalidUrl("missing host".to_string()));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// True when `host` is `domain` itself or a subdomain of it.
pub fn host_in_domain(host: &str, domain: &str) -> bool {
    let host = host.to_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// True when the URL belongs to the designated hostile domain.
pub fn is_hostile(url: &Url) -> bool {
    url.host_str().is_some_and(|h| host_in_domain(h, HOSTILE_DOMAIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com/team").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/team");
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("example.com/about").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_canonicalize_lowercases_host() {
        let url = canonicalize("https://EXAMPLE.COM/Team").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        // path case is preserved
        assert_eq!(url.path(), "/Team");
    }

    #[test]
    fn test_canonicalize_strips_fragment_keeps_query() {
        let url = canonicalize("https://example.com/team?dept=eng#bios").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("dept=eng"));
    }

    #[test]
    fn test_canonicalize_trims_whitespace() {
        let url = canonicalize("  https://example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_canonicalize_rejects_empty() {
        assert!(matches!(canonicalize(""), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_rejects_other_schemes() {
        assert!(matches!(canonicalize("ftp://example.com"), Err(UrlError::UnsupportedScheme(_))));
        assert!(matches!(canonicalize("file:///etc/passwd"), Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_host_in_domain() {
        assert!(host_in_domain("linkedin.com", "linkedin.com"));
        assert!(host_in_domain("www.linkedin.com", "linkedin.com"));
        assert!(host_in_domain("de.linkedin.com", "linkedin.com"));
        assert!(!host_in_domain("linkedin.com.evil.com", "linkedin.com"));
        assert!(!host_in_domain("notlinkedin.com", "linkedin.com"));
    }

    #[test]
    fn test_is_hostile() {
        let hostile = canonicalize("https://www.linkedin.com/in/someone").unwrap();
        assert!(is_hostile(&hostile));

        let plain = canonicalize("https://example.com/team").unwrap();
        assert!(!is_hostile(&plain));
    }
}
