use thiserror::Error;

/// Environment variable the binary reads the API key from.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("TMDB API key is required. Set {API_KEY_ENV} or pass --api-key")]
    MissingApiKey,

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render {chart}: {message}")]
    Render { chart: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub(crate) fn render(chart: &'static str, err: impl std::fmt::Display) -> Self {
        AnalyzerError::Render {
            chart,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
