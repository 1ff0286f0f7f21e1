//! Configuration validation rules.
//!
//! Validation runs after loading, regardless of which layer supplied
//! each value.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - any timeout is under 100ms or over 5 minutes
    /// - the overall deadline is shorter than a single fetch timeout
    /// - `max_content_chars` is outside 500..=100000
    /// - `cache_ttl_hours` is outside 1..=720
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("timeout_ms", self.timeout_ms),
            ("ai_timeout_ms", self.ai_timeout_ms),
            ("overall_timeout_ms", self.overall_timeout_ms),
        ] {
            if value < 100 {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must be at least 100ms".into(),
                });
            }
            if value > 300_000 {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if self.overall_timeout_ms < self.timeout_ms {
            return Err(ConfigError::Invalid {
                field: "overall_timeout_ms".into(),
                reason: "must not be shorter than timeout_ms".into(),
            });
        }

        if !(500..=100_000).contains(&self.max_content_chars) {
            return Err(ConfigError::Invalid {
                field: "max_content_chars".into(),
                reason: "must be between 500 and 100000".into(),
            });
        }

        if !(1..=720).contains(&self.cache_ttl_hours) {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_hours".into(),
                reason: "must be between 1 and 720 hours".into(),
            });
        }

        if self.ai_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "ai_base_url".into(),
                reason: "must not be empty".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_ai_timeout_exceeds_limit() {
        let config = AppConfig { ai_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ai_timeout_ms")
        );
    }

    #[test]
    fn test_validate_overall_shorter_than_fetch() {
        let config =
            AppConfig { timeout_ms: 30_000, overall_timeout_ms: 10_000, ..Default::default() };
        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "overall_timeout_ms")
        );
    }

    #[test]
    fn test_validate_content_budget_bounds() {
        let config = AppConfig { max_content_chars: 100, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { max_content_chars: 500, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cache_ttl_bounds() {
        let config = AppConfig { cache_ttl_hours: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { cache_ttl_hours: 720, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_ai_base_url() {
        let config = AppConfig { ai_base_url: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ai_base_url")
        );
    }
}
