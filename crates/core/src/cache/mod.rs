//! In-memory TTL cache for scrape results.
//!
//! The cache maps source URLs to the profile sequences a scrape produced,
//! so repeated requests within the TTL window return identical results
//! without re-fetching. It supports:
//!
//! - Lazy eviction on lookup (expired entries are removed and treated as
//!   absent)
//! - A full expiry sweep after every insert
//! - Explicit lifecycle operations: `purge_expired`, `clear`, `stats`
//!
//! Entries are derived, idempotent artifacts: concurrent writers to the
//! same URL race and last write wins. There is no capacity bound; growth
//! over the process lifetime is an accepted limitation.

pub mod key;

pub use key::cache_key;

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::profile::Profile;

/// Default entry lifetime.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// One cached scrape result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub url: String,
    pub profiles: Vec<Profile>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Cache statistics for observability surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of live entries.
    pub entries: usize,
    /// Total profiles across all entries.
    pub profiles: usize,
}

/// In-memory, mutex-guarded URL → profiles cache.
#[derive(Debug)]
pub struct ProfileCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_HOURS)
    }
}

impl ProfileCache {
    /// Create a cache whose entries live for `ttl_hours`.
    pub fn new(ttl_hours: i64) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl: Duration::hours(ttl_hours.max(1)) }
    }

    /// Look up the cached profiles for a URL.
    ///
    /// Expired entries are removed on the way out and reported as absent.
    pub fn get(&self, url: &str) -> Option<Vec<Profile>> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let key = cache_key(url);
        let now = Utc::now();

        match entries.get(&key) {
            Some(entry) if entry.is_expired(now) => {
                tracing::debug!(url, "evicting expired cache entry");
                entries.remove(&key);
                None
            }
            Some(entry) => Some(entry.profiles.clone()),
            None => None,
        }
    }

    /// Store the profiles scraped from a URL, then sweep expired entries.
    pub fn put(&self, url: &str, profiles: Vec<Profile>) {
        let now = Utc::now();
        let entry = CacheEntry {
            url: url.to_string(),
            profiles,
            cached_at: now,
            expires_at: now + self.ttl,
        };

        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(cache_key(url), entry);
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        if before > entries.len() {
            tracing::debug!(swept = before - entries.len(), "post-insert cache sweep");
        }
    }

    /// Remove all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    /// Current entry and profile counts.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().expect("cache lock poisoned");
        CacheStats {
            entries: entries.len(),
            profiles: entries.values().map(|e| e.profiles.len()).sum(),
        }
    }

    /// All profiles across live entries, in no particular order.
    pub fn all_profiles(&self) -> Vec<Profile> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries.values().flat_map(|e| e.profiles.iter().cloned()).collect()
    }

    #[cfg(test)]
    fn insert_raw(&self, url: &str, entry: CacheEntry) {
        self.entries.lock().expect("cache lock poisoned").insert(cache_key(url), entry);
    }
}
