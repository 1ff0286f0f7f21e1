//! Profile scraping pipeline for persona.
//!
//! This crate provides the HTTP fetch pipeline with anti-blocking
//! fallbacks, the three profile extraction strategies, the merge/dedup
//! engine, and the [`ScrapeService`] orchestrator that ties them to the
//! cache in `persona-core`.

pub mod extract;
pub mod fetch;
pub mod merge;
pub mod service;

pub use extract::{
    AiExtractor, HeuristicExtractor, ProfileExtractor, SiteSpecificExtractor,
    ai::{ChatClient, ChatConfig},
};
pub use fetch::{ArchiveClient, ArchiveConfig, FetchClient, FetchConfig, FetchedPage, canonicalize};
pub use merge::{merge_profiles, names_similar, titles_similar};
pub use service::{DEFAULT_MAX_PROFILES, ScrapeResult, ScrapeService};
