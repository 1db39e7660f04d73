use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::client::MovieSource;
use crate::correlation::{compute_correlation, render_heatmap, CorrelationMatrix};
use crate::eda::{render_panel, PanelOutcome};
use crate::eda_statistics::{compute_statistics, MovieStatistics};
use crate::error::Result;
use crate::fetcher::fetch_movies;

pub const DEFAULT_LIMIT: usize = 100;
pub const HEATMAP_FILE: &str = "correlation_heatmap.png";
pub const PANEL_FILE: &str = "movie_panel.png";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub year: u16,
    pub limit: usize,
    pub with_details: bool,
    pub output_dir: PathBuf,
}

impl ReportOptions {
    pub fn new(year: u16) -> Self {
        ReportOptions {
            year,
            limit: DEFAULT_LIMIT,
            with_details: true,
            output_dir: PathBuf::from("charts"),
        }
    }
}

/// What a report run produced, mostly for callers that want to inspect it.
#[derive(Debug)]
pub struct ReportSummary {
    pub statistics: MovieStatistics,
    pub correlation: Option<CorrelationMatrix>,
    pub heatmap: Option<PathBuf>,
    pub panel: PanelOutcome,
}

/// "$1,234,568" style formatting, rounded to whole units.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

struct StatisticsReport<'a> {
    year: u16,
    stats: &'a MovieStatistics,
}

impl fmt::Display for StatisticsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        writeln!(f, "Movie statistics for {} ({} movies)", self.year, stats.movie_count)?;
        writeln!(f, "  Average rating:     {:.2}", stats.average_rating)?;
        writeln!(f, "  Median popularity:  {:.2}", stats.popularity_median)?;

        match &stats.financials {
            Some(financials) => {
                writeln!(f, "  Average budget:     {}", format_currency(financials.avg_budget))?;
                writeln!(f, "  Average revenue:    {}", format_currency(financials.avg_revenue))?;
                writeln!(f, "  Average ROI:        {:.2}%", financials.avg_roi * 100.0)?;
                writeln!(f, "  Average runtime:    {:.1} min", financials.avg_runtime)?;
            }
            None => writeln!(f, "  Budget, revenue and runtime not fetched")?,
        }

        writeln!(f, "  Languages:")?;
        for language in &stats.languages {
            let share = if stats.movie_count == 0 {
                0.0
            } else {
                language.count as f64 / stats.movie_count as f64 * 100.0
            };
            writeln!(f, "    {:<6} {:>5} ({:.1}%)", language.code, language.count, share)?;
        }
        Ok(())
    }
}

pub fn format_statistics(year: u16, stats: &MovieStatistics) -> String {
    StatisticsReport { year, stats }.to_string()
}

pub fn run_report<S: MovieSource + ?Sized>(source: &S, options: &ReportOptions) -> Result<ReportSummary> {
    log::info!(
        "Building report for {} (limit {}, details: {})",
        options.year,
        options.limit,
        options.with_details
    );

    let movies = fetch_movies(source, options.year, options.limit, options.with_details)?;

    let statistics = compute_statistics(&movies);
    println!("{}", format_statistics(options.year, &statistics));

    if !movies.is_empty() {
        fs::create_dir_all(&options.output_dir)?;
    }

    let correlation = compute_correlation(&movies);
    let heatmap = match &correlation {
        Some(matrix) => {
            println!("Correlation matrix ({} movies with budget and revenue):", matrix.sample_size());
            println!("{}", matrix);
            let path = options.output_dir.join(HEATMAP_FILE);
            render_heatmap(matrix, &path)?;
            Some(path)
        }
        None => {
            println!("Insufficient data for correlation analysis (no movies with both budget and revenue).");
            None
        }
    };

    let panel = render_panel(&movies, &options.output_dir.join(PANEL_FILE))?;

    Ok(ReportSummary {
        statistics,
        correlation,
        heatmap,
        panel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eda_statistics::tests::movie;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_000.0), "$1,000");
        assert_eq!(format_currency(1_234_567.8), "$1,234,568");
        assert_eq!(format_currency(-25_000.0), "-$25,000");
    }

    #[test]
    fn statistics_text_contains_every_metric() {
        let movies = vec![
            movie(8.0, 50.0, "en", 1000, 3000, 120),
            movie(6.0, 20.0, "fr", 0, 0, 90),
        ];
        let text = format_statistics(2019, &compute_statistics(&movies));

        assert!(text.contains("2019 (2 movies)"));
        assert!(text.contains("Average rating:     7.00"));
        assert!(text.contains("Median popularity:  35.00"));
        assert!(text.contains("Average budget:     $500"));
        assert!(text.contains("Average ROI:        200.00%"));
        assert!(text.contains("Average runtime:    105.0 min"));
        assert!(text.contains("en         1 (50.0%)"));
    }

    #[test]
    fn statistics_text_for_summary_only_fetch() {
        let mut plain = movie(7.0, 10.0, "ja", 0, 0, 0);
        plain.enriched = false;
        let text = format_statistics(2001, &compute_statistics(&[plain]));

        assert!(text.contains("not fetched"));
        assert!(!text.contains("Average budget"));
    }

    #[test]
    fn statistics_text_for_empty_year_lists_every_line() {
        let text = format_statistics(1900, &compute_statistics(&[]));

        assert_eq!(text.lines().count(), 8);
        assert!(text.contains("1900 (0 movies)"));
        assert!(text.contains("Average runtime:    0.0 min"));
        assert!(text.ends_with("  Languages:\n"));
    }

    #[test]
    fn default_options() {
        let options = ReportOptions::new(2024);
        assert_eq!(options.limit, 100);
        assert!(options.with_details);
        assert_eq!(options.output_dir, PathBuf::from("charts"));
    }
}
