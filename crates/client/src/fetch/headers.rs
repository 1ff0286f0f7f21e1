//! Browser-imitating request headers.
//!
//! Sites that serve profile pages routinely fingerprint clients, so
//! every fetch goes out with a mainstream-browser header bundle and a
//! user-agent rotated per request. The hostile-site chain upgrades to
//! the extended stealth set.

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue};

pub(crate) const USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/123.0.0.0 Safari/537.36",
];

/// Pick a user-agent from the rotation pool.
pub(crate) fn random_user_agent() -> &'static str {
    USER_AGENTS.choose(&mut rand::thread_rng()).copied().unwrap_or(USER_AGENTS[0])
}

/// Standard browser header bundle sent with every page fetch.
pub(crate) fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, "user-agent", user_agent);
    headers.insert(
        "accept",
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert("connection", HeaderValue::from_static("keep-alive"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers
}

/// Extended stealth header set for the hostile-site fallback chain.
pub(crate) fn stealth_headers() -> HeaderMap {
    let mut headers = browser_headers(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    );
    headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert("cache-control", HeaderValue::from_static("max-age=0"));
    headers.insert("dnt", HeaderValue::from_static("1"));
    headers
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_user_agent_from_pool() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
    }

    #[test]
    fn test_browser_headers_carry_identity() {
        let headers = browser_headers(USER_AGENTS[0]);
        assert_eq!(headers.get("user-agent").unwrap(), USER_AGENTS[0]);
        assert!(headers.get("accept").unwrap().to_str().unwrap().contains("text/html"));
        assert!(headers.contains_key("accept-language"));
    }

    #[test]
    fn test_stealth_headers_extend_browser_set() {
        let headers = stealth_headers();
        for name in ["user-agent", "accept", "sec-fetch-dest", "sec-fetch-mode", "dnt", "cache-control"] {
            assert!(headers.contains_key(name), "missing {name}");
        }
    }
}
