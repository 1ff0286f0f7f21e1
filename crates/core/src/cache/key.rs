//! Cache key generation.
//!
//! Entries are keyed by the SHA-256 of the canonical source URL, which
//! bounds key size and makes the map insensitive to pathological URLs.

use sha2::{Digest, Sha256};

/// Compute the cache key for a source URL.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.trim().as_bytes());
    hex::encode(hasher.finalize())
}
