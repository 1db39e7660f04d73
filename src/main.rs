use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use movie_eda::config::{DEFAULT_BASE_URL, TmdbConfig};
use movie_eda::report::{run_report, ReportOptions, DEFAULT_LIMIT};
use movie_eda::TmdbClient;

mod logging;

/// Statistics and charts for the most popular movies of a release year.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Release year to analyse
    year: u16,

    /// Maximum number of movies to fetch
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Skip the per-movie detail requests (no budget, revenue or runtime)
    #[arg(long)]
    no_details: bool,

    /// Directory the charts are written to
    #[arg(short, long, default_value = "charts")]
    output_dir: PathBuf,

    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::setup_logging(args.verbose);

    let config = TmdbConfig::new(args.api_key)?
        .with_base_url(args.base_url)
        .with_timeout(Duration::from_secs(args.timeout));
    let client = TmdbClient::new(config)?;

    let options = ReportOptions {
        year: args.year,
        limit: args.limit,
        with_details: !args.no_details,
        output_dir: args.output_dir,
    };
    let summary = run_report(&client, &options)?;

    if let Some(path) = &summary.heatmap {
        println!("Heatmap saved to {}", path.display());
    }
    if let movie_eda::eda::PanelOutcome::Rendered(path) = &summary.panel {
        println!("Charts saved to {}", path.display());
    }

    Ok(())
}
