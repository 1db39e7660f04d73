//! Fetches a year's most popular movies from TMDB and reports on them:
//! summary statistics, a correlation matrix and a panel of charts.

pub mod client;
pub mod config;
pub mod correlation;
pub mod eda;
pub mod eda_statistics;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod report;

pub use client::{MovieSource, TmdbClient};
pub use config::TmdbConfig;
pub use error::{AnalyzerError, Result};
pub use models::{MovieCollection, MovieRecord};
pub use report::{run_report, ReportOptions, ReportSummary};
