use std::time::Duration;

use crate::error::{AnalyzerError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the movie database API.
///
/// The key is handed in by the caller; nothing here reads the process
/// environment.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl TmdbConfig {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(AnalyzerError::MissingApiKey)?;

        Ok(TmdbConfig {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::API_KEY_ENV;

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = TmdbConfig::new(None).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingApiKey));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn blank_key_is_rejected() {
        assert!(TmdbConfig::new(Some("   ".to_string())).is_err());
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let config = TmdbConfig::new(Some("abc".to_string()))
            .unwrap()
            .with_base_url("http://localhost:8080/3/");
        assert_eq!(config.base_url, "http://localhost:8080/3");
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
