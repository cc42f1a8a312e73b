//! Engine configuration with sensible defaults.
//!
//! [`SearchConfig`] controls fan-out width, timeouts, paging limits and
//! request pacing. It can be built in code or loaded from TOML.

use serde::Deserialize;

use crate::error::SearchError;

/// Configuration for the release search engine.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of indexers queried at the same time.
    pub max_in_flight: usize,
    /// Deadline in seconds for one indexer's whole tier chain.
    pub provider_timeout_seconds: u64,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_seconds: u64,
    /// Maximum pages requested per query on paged indexers.
    pub max_pages: u32,
    /// Stop paging a query once this many results were collected.
    pub max_results_per_query: usize,
    /// Random delay range in milliseconds `(min, max)` between successive
    /// requests to the same indexer. `(0, 0)` disables pacing.
    pub request_delay_ms: (u64, u64),
    /// User-Agent sent to indexers. `None` uses the crate's own.
    pub user_agent: Option<String>,
}

/// Upper bound for `max_pages`; every page URL is built before fetching.
pub const MAX_PAGES_LIMIT: u32 = 100;

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            provider_timeout_seconds: 30,
            request_timeout_seconds: 15,
            max_pages: 5,
            max_results_per_query: 1000,
            request_delay_ms: (0, 0),
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the document is malformed or the
    /// resulting configuration fails [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> Result<Self, SearchError> {
        let config: Self = toml::from_str(source)
            .map_err(|e| SearchError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_in_flight` must be greater than 0
    /// - `provider_timeout_seconds` and `request_timeout_seconds` must be greater than 0
    /// - `max_pages` must be between 1 and [`MAX_PAGES_LIMIT`]
    /// - `max_results_per_query` must be greater than 0
    /// - `request_delay_ms.0` must be <= `request_delay_ms.1`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_in_flight == 0 {
            return Err(SearchError::Config(
                "max_in_flight must be greater than 0".into(),
            ));
        }
        if self.provider_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "provider_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_pages == 0 {
            return Err(SearchError::Config("max_pages must be greater than 0".into()));
        }
        if self.max_pages > MAX_PAGES_LIMIT {
            return Err(SearchError::Config(format!(
                "max_pages must be at most {MAX_PAGES_LIMIT}"
            )));
        }
        if self.max_results_per_query == 0 {
            return Err(SearchError::Config(
                "max_results_per_query must be greater than 0".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(SearchError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.max_in_flight, 8);
        assert_eq!(config.provider_timeout_seconds, 30);
        assert_eq!(config.request_timeout_seconds, 15);
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.max_results_per_query, 1000);
        assert_eq!(config.request_delay_ms, (0, 0));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_in_flight_rejected() {
        let config = SearchConfig {
            max_in_flight: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_in_flight"));
    }

    #[test]
    fn zero_timeouts_rejected() {
        let config = SearchConfig {
            provider_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("provider_timeout_seconds"));

        let config = SearchConfig {
            request_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("request_timeout_seconds"));
    }

    #[test]
    fn zero_pages_rejected() {
        let config = SearchConfig {
            max_pages: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("max_pages"));
    }

    #[test]
    fn excessive_pages_rejected() {
        let config = SearchConfig {
            max_pages: MAX_PAGES_LIMIT + 1,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("max_pages"));

        let at_limit = SearchConfig {
            max_pages: MAX_PAGES_LIMIT,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn zero_results_per_query_rejected() {
        let config = SearchConfig {
            max_results_per_query: 0,
            ..Default::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_results_per_query"));
    }

    #[test]
    fn invalid_delay_range_rejected() {
        let config = SearchConfig {
            request_delay_ms: (500, 100),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("delay"));
    }

    #[test]
    fn toml_overrides_and_defaults() {
        let config = SearchConfig::from_toml_str(
            r#"
            max_in_flight = 2
            max_pages = 3
            request_delay_ms = [50, 200]
            user_agent = "Searcher/1.0"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.max_in_flight, 2);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.request_delay_ms, (50, 200));
        assert_eq!(config.user_agent.as_deref(), Some("Searcher/1.0"));
        assert_eq!(config.provider_timeout_seconds, 30);
    }

    #[test]
    fn toml_invalid_values_rejected() {
        let err = SearchConfig::from_toml_str("max_in_flight = 0").unwrap_err();
        assert!(err.to_string().contains("max_in_flight"));
    }

    #[test]
    fn toml_malformed_rejected() {
        let err = SearchConfig::from_toml_str("max_in_flight = [").unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }
}
