use serde::Deserialize;

// Response schemas, decoded once at the client boundary

/// One page of the `/discover/movie` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub results: Vec<DiscoverItem>,
}

fn first_page() -> u32 {
    1
}

/// Summary record as listed by the discover endpoint. The four analysed
/// fields are required; a response without them fails to decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscoverItem {
    pub id: u64,
    pub title: String,
    pub vote_average: f64,
    pub popularity: f64,
    pub original_language: String,
}

/// Subset of `/movie/{id}` used for enrichment. TMDB sends `null` runtimes
/// for unreleased titles, so every field is optional and defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieDetails {
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    pub vote_average: f64,
    pub popularity: f64,
    pub original_language: String,
    pub budget: u64,
    pub revenue: u64,
    pub runtime: u32,
    /// Whether the detail fields came from the detail endpoint.
    pub enriched: bool,
}

pub type MovieCollection = Vec<MovieRecord>;

impl MovieRecord {
    pub fn from_summary(item: DiscoverItem) -> Self {
        MovieRecord {
            id: item.id,
            title: item.title,
            vote_average: item.vote_average,
            popularity: item.popularity,
            original_language: item.original_language,
            budget: 0,
            revenue: 0,
            runtime: 0,
            enriched: false,
        }
    }

    pub fn with_details(mut self, details: MovieDetails) -> Self {
        self.budget = details.budget.unwrap_or(0);
        self.revenue = details.revenue.unwrap_or(0);
        self.runtime = details.runtime.unwrap_or(0);
        self.enriched = true;
        self
    }

    /// Return on investment, `None` when there is no budget to divide by.
    pub fn roi(&self) -> Option<f64> {
        if self.budget == 0 {
            return None;
        }
        Some((self.revenue as f64 - self.budget as f64) / self.budget as f64)
    }

    pub fn has_financials(&self) -> bool {
        self.budget > 0 && self.revenue > 0
    }
}
