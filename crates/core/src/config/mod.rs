//! Application configuration with layered loading.
//!
//! Configuration is assembled from multiple sources using figment:
//!
//! 1. Environment variables (PERSONA_*)
//! 2. TOML config file (if PERSONA_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Value that disables AI extraction when left in place of a real key.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PERSONA_*)
/// 2. TOML config file (if PERSONA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the AI chat-completions service.
    ///
    /// Set via PERSONA_AI_API_KEY. Absent or placeholder values disable
    /// the AI extraction strategy without failing the system.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Base URL of the AI chat-completions service.
    ///
    /// Set via PERSONA_AI_BASE_URL.
    #[serde(default = "default_ai_base_url")]
    pub ai_base_url: String,

    /// Model name sent with every AI request.
    ///
    /// Set via PERSONA_AI_MODEL.
    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// Per-request HTTP timeout for page fetches, in milliseconds.
    ///
    /// Set via PERSONA_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for AI service calls, in milliseconds.
    ///
    /// Set via PERSONA_AI_TIMEOUT_MS.
    #[serde(default = "default_ai_timeout_ms")]
    pub ai_timeout_ms: u64,

    /// Deadline for one whole scrape run, in milliseconds.
    ///
    /// Set via PERSONA_OVERALL_TIMEOUT_MS.
    #[serde(default = "default_overall_timeout_ms")]
    pub overall_timeout_ms: u64,

    /// Cache entry lifetime in hours.
    ///
    /// Set via PERSONA_CACHE_TTL_HOURS.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,

    /// Character budget for the condensed page text sent to the model.
    ///
    /// Set via PERSONA_MAX_CONTENT_CHARS.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_ai_timeout_ms() -> u64 {
    60_000
}

fn default_overall_timeout_ms() -> u64 {
    120_000
}

fn default_cache_ttl_hours() -> i64 {
    24
}

fn default_max_content_chars() -> usize {
    8_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai_api_key: None,
            ai_base_url: default_ai_base_url(),
            ai_model: default_ai_model(),
            timeout_ms: default_timeout_ms(),
            ai_timeout_ms: default_ai_timeout_ms(),
            overall_timeout_ms: default_overall_timeout_ms(),
            cache_ttl_hours: default_cache_ttl_hours(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl AppConfig {
    /// Fetch timeout as a Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// AI call timeout as a Duration.
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }

    /// Whole-scrape deadline as a Duration.
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    /// Whether the AI extraction strategy can run.
    ///
    /// True only when a key is present and is not the documented
    /// placeholder.
    pub fn ai_enabled(&self) -> bool {
        self.ai_api_key
            .as_deref()
            .map(str::trim)
            .is_some_and(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PERSONA_`
    /// 2. TOML file from `PERSONA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, values cannot
    /// be parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PERSONA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PERSONA_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
