//! Scrape orchestration.
//!
//! [`ScrapeService`] owns the cache, the fetch client, and the three
//! extractors, and sequences one linear pipeline per call: cache check →
//! fetch → site-specific → heuristic → AI → merge/dedup → cache write.
//! Extraction stages run sequentially; each one is error-isolated, and
//! no failure of any kind crosses the `scrape` boundary. Callers always
//! get a (possibly empty) profile sequence plus run metadata.

use std::time::Instant;

use serde::Serialize;
use url::Url;

use persona_core::{AppConfig, Error, ExtractionStrategy, Profile, ProfileCache};

use crate::extract::{
    AiExtractor, HeuristicExtractor, ProfileExtractor, SiteSpecificExtractor,
    ai::{ChatClient, ChatConfig},
};
use crate::fetch::{FetchClient, FetchConfig, canonicalize};
use crate::merge::merge_profiles;

/// Default result cap per request.
pub const DEFAULT_MAX_PROFILES: usize = 10;

/// Outcome of one scrape run: the ranked profiles plus metadata about
/// how they were produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeResult {
    /// Deduplicated profiles, ranked by confidence and truncated to the
    /// requested maximum.
    pub profiles: Vec<Profile>,
    /// Strategies that were invoked, in execution order.
    pub strategies: Vec<ExtractionStrategy>,
    /// Stringified per-stage failures; the run continues past them.
    pub errors: Vec<String>,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
    /// True when the result was served from cache without fetching.
    pub from_cache: bool,
}

/// Profile scraping service: the public entry point of the pipeline.
pub struct ScrapeService {
    config: AppConfig,
    cache: ProfileCache,
    fetcher: FetchClient,
    site: SiteSpecificExtractor,
    heuristic: HeuristicExtractor,
    ai: Option<AiExtractor>,
}

impl ScrapeService {
    /// Build a service from configuration.
    ///
    /// A missing or placeholder AI key disables the AI strategy without
    /// failing construction.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let fetcher = FetchClient::new(FetchConfig {
            timeout: config.timeout(),
            ..Default::default()
        })?;

        let ai = if config.ai_enabled() {
            let chat_config = ChatConfig {
                api_key: config.ai_api_key.clone().unwrap_or_default(),
                base_url: config.ai_base_url.clone(),
                model: config.ai_model.clone(),
                timeout: config.ai_timeout(),
            };
            let extractor = AiExtractor::new(ChatClient::new(chat_config)?)
                .with_content_budget(config.max_content_chars);
            tracing::info!(model = %config.ai_model, "AI extraction enabled");
            Some(extractor)
        } else {
            tracing::info!("AI extraction disabled: no usable API key");
            None
        };

        let cache = ProfileCache::new(config.cache_ttl_hours);

        Ok(Self {
            config,
            cache,
            fetcher,
            site: SiteSpecificExtractor::new(),
            heuristic: HeuristicExtractor::new(),
            ai,
        })
    }

    /// Build a service from environment/file configuration.
    pub fn from_env() -> Result<Self, Error> {
        let config = AppConfig::load().map_err(|e| Error::Config(e.to_string()))?;
        Self::new(config)
    }

    /// Whether the AI strategy is available this process.
    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// The cache, for lifecycle operations (clear, purge, stats).
    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    /// Scrape profiles from a page, returning just the profile sequence.
    pub async fn scrape_profiles(&self, url: &str, max_profiles: usize) -> Vec<Profile> {
        self.scrape(url, max_profiles).await.profiles
    }

    /// Advisory reachability probe for a URL.
    pub async fn validate_url(&self, url: &str) -> bool {
        self.fetcher.validate(url).await
    }

    /// Scrape profiles from a page with full run metadata.
    pub async fn scrape(&self, url: &str, max_profiles: usize) -> ScrapeResult {
        let started = Instant::now();
        let mut result = ScrapeResult::default();

        let canonical = match canonicalize(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(url, error = %e, "rejecting unusable URL");
                result.errors.push(format!("url: {e}"));
                result.elapsed_ms = started.elapsed().as_millis() as u64;
                return result;
            }
        };

        if let Some(cached) = self.cache.get(canonical.as_str()) {
            tracing::debug!(url = %canonical, "cache hit");
            result.profiles = cached.into_iter().take(max_profiles).collect();
            result.from_cache = true;
            result.elapsed_ms = started.elapsed().as_millis() as u64;
            return result;
        }

        let outcome = tokio::time::timeout(
            self.config.overall_timeout(),
            self.run_pipeline(&canonical, max_profiles, &mut result),
        )
        .await;

        match outcome {
            Ok(profiles) => result.profiles = profiles,
            Err(_) => {
                tracing::warn!(url = %canonical, "scrape deadline exceeded, returning empty result");
                result.errors.push("overall deadline exceeded".to_string());
            }
        }

        result.elapsed_ms = started.elapsed().as_millis() as u64;
        result
    }

    /// Fetch, extract, merge, and cache. Per-stage failures land in the
    /// result's error list; only total fetch failure short-circuits.
    async fn run_pipeline(
        &self,
        url: &Url,
        max_profiles: usize,
        result: &mut ScrapeResult,
    ) -> Vec<Profile> {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "no markup obtained");
                result.errors.push(format!("fetch: {e}"));
                return Vec::new();
            }
        };

        let mut candidates: Vec<Vec<Profile>> = Vec::new();

        for extractor in [&self.site as &dyn ProfileExtractor, &self.heuristic] {
            self.run_extractor(extractor, &page.html, url, &mut candidates, result).await;
        }

        let found: usize = candidates.iter().map(Vec::len).sum();
        if found < max_profiles
            && let Some(ai) = &self.ai
        {
            self.run_extractor(ai, &page.html, url, &mut candidates, result).await;
        }

        let merged = merge_profiles(candidates);
        let profiles: Vec<Profile> = merged.into_iter().take(max_profiles).collect();

        self.cache.put(url.as_str(), profiles.clone());
        tracing::debug!(
            url = %url,
            profiles = profiles.len(),
            strategies = ?result.strategies,
            "scrape complete"
        );

        profiles
    }

    async fn run_extractor(
        &self,
        extractor: &dyn ProfileExtractor,
        html: &str,
        url: &Url,
        candidates: &mut Vec<Vec<Profile>>,
        result: &mut ScrapeResult,
    ) {
        let strategy = extractor.strategy();
        result.strategies.push(strategy);

        match extractor.extract(html, url).await {
            Ok(profiles) => {
                tracing::debug!(%strategy, count = profiles.len(), "extractor finished");
                if !profiles.is_empty() {
                    candidates.push(profiles);
                }
            }
            Err(e) => {
                tracing::warn!(%strategy, error = %e, "extractor failed, continuing");
                result.errors.push(format!("{strategy}: {e}"));
            }
        }
    }
}
