//! Error types for the release-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. API keys never appear in error messages;
//! request URLs are redacted before they are embedded.

/// Errors that can occur while searching indexers.
///
/// Searches themselves only fail with [`SearchError::InvalidArgument`] or
/// [`SearchError::Config`] (plus [`SearchError::Http`] when no HTTP client
/// can be built). The remaining variants describe per-provider or
/// per-candidate failures that the dispatcher recovers from locally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// A caller-supplied value was unusable (empty title, malformed criteria).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid engine or provider configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A request to an indexer failed at the transport level or returned
    /// a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider did not finish before its deadline.
    #[error("indexer timed out: {0}")]
    Timeout(String),

    /// The indexer answered that the requested function is not available.
    /// Advances the tier ladder instead of failing the provider.
    #[error("unsupported by indexer: {0}")]
    Unsupported(String),

    /// A payload or a single candidate could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience type alias for release-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_argument() {
        let err = SearchError::InvalidArgument("title must not be empty".into());
        assert_eq!(err.to_string(), "invalid argument: title must not be empty");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_in_flight must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_in_flight must be > 0");
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("exceeded 30s limit".into());
        assert_eq!(err.to_string(), "indexer timed out: exceeded 30s limit");
    }

    #[test]
    fn display_unsupported() {
        let err = SearchError::Unsupported("203 function not available".into());
        assert_eq!(
            err.to_string(),
            "unsupported by indexer: 203 function not available"
        );
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("unexpected XML structure".into());
        assert_eq!(err.to_string(), "parse error: unexpected XML structure");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
