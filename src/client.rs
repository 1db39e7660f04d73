use reqwest::blocking::Client;
use reqwest::header;
use serde::de::DeserializeOwned;

use crate::config::TmdbConfig;
use crate::error::{AnalyzerError, Result};
use crate::models::{DiscoverPage, MovieDetails};

/// Anything that can answer the two queries the fetcher needs.
pub trait MovieSource {
    /// Page `page` (1-based) of movies released in `year`, most popular first.
    fn discover(&self, year: u16, page: u32) -> Result<DiscoverPage>;

    fn details(&self, movie_id: u64) -> Result<MovieDetails>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let user_agent = header::HeaderValue::from_static(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|source| AnalyzerError::Http {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self { client, config })
    }

    fn discover_url(&self) -> String {
        format!("{}/discover/movie", self.config.base_url)
    }

    fn details_url(&self, movie_id: u64) -> String {
        format!("{}/movie/{}", self.config.base_url, movie_id)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let http_error = |source| AnalyzerError::Http {
            url: url.to_string(),
            source,
        };

        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(query)
            .send()
            .map_err(http_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(http_error)?;
        serde_json::from_str(&body).map_err(|source| AnalyzerError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl MovieSource for TmdbClient {
    fn discover(&self, year: u16, page: u32) -> Result<DiscoverPage> {
        log::debug!("Requesting discover page {} for {}", page, year);
        self.get_json(
            &self.discover_url(),
            &[
                ("primary_release_year", year.to_string()),
                ("sort_by", "popularity.desc".to_string()),
                ("page", page.to_string()),
            ],
        )
    }

    fn details(&self, movie_id: u64) -> Result<MovieDetails> {
        log::debug!("Requesting details for movie {}", movie_id);
        self.get_json(&self.details_url(movie_id), &[])
    }
}
