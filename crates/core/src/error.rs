//! Unified error types for persona.
//!
//! Every fallible stage of the pipeline maps into this enum. The
//! orchestrator catches all of them at its boundary; callers of
//! `scrape_profiles` never see an `Error`.

/// Unified error type for the scraping pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// URL failed canonicalization.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The target page returned 404.
    #[error("page not found: {0}")]
    NotFound(String),

    /// Network-level fetch failure.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// Request timed out.
    #[error("request timeout")]
    Timeout,

    /// Rate limited by the target host or an upstream service.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Unexpected HTTP status with no usable body.
    #[error("HTTP error: {status}")]
    HttpStatus { status: u16 },

    /// Every approach in the hostile-site fallback chain failed.
    #[error("all fetch approaches failed for {0}")]
    AllApproachesFailed(String),

    /// A fallback response did not look like real profile markup.
    #[error("insufficient content: {0}")]
    InsufficientContent(String),

    /// AI strategy cannot run (missing key, auth failure).
    #[error("AI extraction unavailable: {0}")]
    AiUnavailable(String),

    /// Model output could not be parsed into the documented shape.
    #[error("AI response parse error: {0}")]
    AiParse(String),

    /// Extractor-internal failure.
    #[error("extraction failed: {0}")]
    ExtractFailed(String),

    /// Configuration error surfaced at service construction.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("https://example.com/missing".to_string());
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("example.com"));

        let err = Error::HttpStatus { status: 503 };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
