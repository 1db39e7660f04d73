use itertools::Itertools;
use statrs::statistics::{Data, Median, Statistics};

use crate::models::MovieRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageCount {
    pub code: String,
    pub count: usize,
}

/// Averages over the detail-endpoint fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinancialSummary {
    pub avg_budget: f64,
    pub avg_revenue: f64,
    /// Mean ROI over movies with a positive budget only.
    pub avg_roi: f64,
    pub avg_runtime: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieStatistics {
    pub movie_count: usize,
    pub average_rating: f64,
    pub popularity_median: f64,
    /// Most frequent first, ties by language code.
    pub languages: Vec<LanguageCount>,
    /// `None` when any movie was fetched without its details.
    pub financials: Option<FinancialSummary>,
}

// Every aggregate falls back to 0.0 on empty input
pub(crate) fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.mean()
    }
}

pub(crate) fn median_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        Data::new(values.to_vec()).median()
    }
}

pub fn language_frequencies(movies: &[MovieRecord]) -> Vec<LanguageCount> {
    movies
        .iter()
        .map(|m| m.original_language.as_str())
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .map(|(code, count)| LanguageCount {
            code: code.to_string(),
            count,
        })
        .collect()
}

pub fn compute_financials(movies: &[MovieRecord]) -> FinancialSummary {
    let budgets: Vec<f64> = movies.iter().map(|m| m.budget as f64).collect();
    let revenues: Vec<f64> = movies.iter().map(|m| m.revenue as f64).collect();
    let runtimes: Vec<f64> = movies.iter().map(|m| m.runtime as f64).collect();
    // roi() is None for zero budgets, so they never reach the division
    let rois: Vec<f64> = movies.iter().filter_map(MovieRecord::roi).collect();

    FinancialSummary {
        avg_budget: mean_or_zero(&budgets),
        avg_revenue: mean_or_zero(&revenues),
        avg_roi: mean_or_zero(&rois),
        avg_runtime: mean_or_zero(&runtimes),
    }
}

pub fn compute_statistics(movies: &[MovieRecord]) -> MovieStatistics {
    let ratings: Vec<f64> = movies.iter().map(|m| m.vote_average).collect();
    let popularity: Vec<f64> = movies.iter().map(|m| m.popularity).collect();

    let financials = if movies.iter().all(|m| m.enriched) {
        Some(compute_financials(movies))
    } else {
        None
    };

    MovieStatistics {
        movie_count: movies.len(),
        average_rating: mean_or_zero(&ratings),
        popularity_median: median_or_zero(&popularity),
        languages: language_frequencies(movies),
        financials,
    }
}
