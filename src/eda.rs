use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

use crate::eda_statistics::{language_frequencies, LanguageCount};
use crate::error::{AnalyzerError, Result};
use crate::models::MovieRecord;

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub const RATING_BIN_WIDTH: f64 = 0.5;
pub const MAX_PIE_SLICES: usize = 8;

const COLOR_BLUE: RGBColor = RGBColor(59, 130, 246);
const COLOR_EMERALD: RGBColor = RGBColor(16, 185, 129);
const COLOR_AMBER: RGBColor = RGBColor(245, 158, 11);
const COLOR_ROSE: RGBColor = RGBColor(244, 63, 94);
const COLOR_PURPLE: RGBColor = RGBColor(139, 92, 246);
const COLOR_PINK: RGBColor = RGBColor(236, 72, 153);
const COLOR_TEAL: RGBColor = RGBColor(20, 184, 166);
const COLOR_ORANGE: RGBColor = RGBColor(249, 115, 22);
const COLOR_SLATE: RGBColor = RGBColor(100, 116, 139);

const PIE_COLORS: [RGBColor; 9] = [
    COLOR_BLUE,
    COLOR_EMERALD,
    COLOR_AMBER,
    COLOR_ROSE,
    COLOR_PURPLE,
    COLOR_PINK,
    COLOR_TEAL,
    COLOR_ORANGE,
    COLOR_SLATE,
];

#[derive(Debug, Clone, PartialEq)]
pub enum PanelOutcome {
    Rendered(PathBuf),
    /// Nothing to plot; no file was written.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
}

/// Counts per 0.5-wide rating bin over 0..10; a perfect 10 lands in the last bin.
pub fn rating_histogram(ratings: &[f64]) -> Vec<usize> {
    let n_bins = (10.0 / RATING_BIN_WIDTH) as usize;
    let mut bins = vec![0; n_bins];
    for &rating in ratings {
        let idx = (rating.clamp(0.0, 10.0) / RATING_BIN_WIDTH) as usize;
        bins[idx.min(n_bins - 1)] += 1;
    }
    bins
}

/// Gaussian kernel density estimate evaluated at `points`, using
/// Silverman's rule of thumb for the bandwidth.
pub fn kernel_density(values: &[f64], points: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return vec![0.0; points.len()];
    }

    let n = values.len() as f64;
    let std_dev = if values.len() > 1 { values.std_dev() } else { 0.0 };
    let bandwidth = if std_dev > 0.0 {
        1.06 * std_dev * n.powf(-0.2)
    } else {
        RATING_BIN_WIDTH
    };
    let kernel = match Normal::new(0.0, 1.0) {
        Ok(kernel) => kernel,
        Err(_) => return vec![0.0; points.len()],
    };

    points
        .iter()
        .map(|&x| {
            values
                .iter()
                .map(|&xi| kernel.pdf((x - xi) / bandwidth))
                .sum::<f64>()
                / (n * bandwidth)
        })
        .collect()
}

/// Language shares for the pie chart, with everything past the first
/// `max_slices - 1` languages folded into "other".
pub fn pie_slices(languages: &[LanguageCount], max_slices: usize) -> Vec<PieSlice> {
    let total: usize = languages.iter().map(|l| l.count).sum();
    if total == 0 || max_slices == 0 {
        return Vec::new();
    }

    let keep = if languages.len() > max_slices {
        max_slices - 1
    } else {
        languages.len()
    };

    let mut slices: Vec<PieSlice> = languages[..keep]
        .iter()
        .map(|l| PieSlice {
            label: l.code.clone(),
            count: l.count,
            fraction: l.count as f64 / total as f64,
        })
        .collect();

    let rest: usize = languages[keep..].iter().map(|l| l.count).sum();
    if rest > 0 {
        slices.push(PieSlice {
            label: "other".to_string(),
            count: rest,
            fraction: rest as f64 / total as f64,
        });
    }
    slices
}

fn draw_rating_histogram(area: &Panel, ratings: &[f64]) -> std::result::Result<(), Box<dyn Error>> {
    let bins = rating_histogram(ratings);

    let samples: Vec<f64> = (0..=200).map(|i| i as f64 * 0.05).collect();
    // Scale the density to counts so both share the y axis
    let density: Vec<f64> = kernel_density(ratings, &samples)
        .into_iter()
        .map(|d| d * ratings.len() as f64 * RATING_BIN_WIDTH)
        .collect();

    let max_count = bins.iter().copied().max().unwrap_or(0) as f64;
    let max_density = density.iter().copied().fold(0.0, f64::max);
    let y_max = max_count.max(max_density).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Rating Distribution", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..10.0, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Vote average")
        .y_desc("Movies")
        .draw()?;

    chart.draw_series(bins.iter().enumerate().map(|(i, &count)| {
        let x0 = i as f64 * RATING_BIN_WIDTH;
        Rectangle::new(
            [(x0, 0.0), (x0 + RATING_BIN_WIDTH, count as f64)],
            COLOR_BLUE.mix(0.6).filled(),
        )
    }))?;

    chart.draw_series(LineSeries::new(
        samples.iter().copied().zip(density.iter().copied()),
        COLOR_ROSE.stroke_width(2),
    ))?;

    Ok(())
}

/// Box and whisker positions for one series. Whiskers end at the most
/// extreme values still inside the Tukey fences.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }

    let quartiles = Quartiles::new(values);
    let [lower_fence, q1, median, q3, upper_fence] = quartiles.values().map(f64::from);

    let (inside, outliers): (Vec<f64>, Vec<f64>) = values
        .iter()
        .copied()
        .partition(|&v| v >= lower_fence && v <= upper_fence);

    // q1..q3 always lies inside the fences, so `inside` is never empty
    let whisker_low = inside.iter().copied().fold(f64::INFINITY, f64::min);
    let whisker_high = inside.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(BoxSummary {
        q1,
        median,
        q3,
        whisker_low: whisker_low.min(q1),
        whisker_high: whisker_high.max(q3),
        outliers,
    })
}

fn draw_popularity_boxplot(area: &Panel, popularity: &[f64]) -> std::result::Result<(), Box<dyn Error>> {
    let summary = match box_summary(popularity) {
        Some(summary) => summary,
        None => return Ok(()),
    };

    let min = popularity.iter().copied().fold(f64::INFINITY, f64::min);
    let max = popularity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max - min) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Popularity", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..2.0, (min - pad)..(max + pad))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(3)
        .x_label_formatter(&|x: &f64| if (*x - 1.0).abs() < 1e-9 { "popularity".to_string() } else { String::new() })
        .y_desc("Popularity score")
        .draw()?;

    let line = COLOR_PURPLE.stroke_width(2);

    chart.draw_series(std::iter::once(Rectangle::new(
        [(0.7, summary.q1), (1.3, summary.q3)],
        COLOR_PURPLE.mix(0.25).filled(),
    )))?;
    chart.draw_series(std::iter::once(Rectangle::new([(0.7, summary.q1), (1.3, summary.q3)], line)))?;

    chart.draw_series(
        [
            vec![(0.7, summary.median), (1.3, summary.median)],
            vec![(1.0, summary.q3), (1.0, summary.whisker_high)],
            vec![(1.0, summary.q1), (1.0, summary.whisker_low)],
            vec![(0.85, summary.whisker_high), (1.15, summary.whisker_high)],
            vec![(0.85, summary.whisker_low), (1.15, summary.whisker_low)],
        ]
        .into_iter()
        .map(|points| PathElement::new(points, line)),
    )?;

    chart.draw_series(
        summary
            .outliers
            .iter()
            .map(|&p| Circle::new((1.0, p), 3, COLOR_PURPLE.filled())),
    )?;

    Ok(())
}

fn draw_budget_scatter(area: &Panel, movies: &[MovieRecord]) -> std::result::Result<(), Box<dyn Error>> {
    let points: Vec<(f64, f64)> = movies
        .iter()
        .filter(|m| m.budget > 0)
        .map(|m| (m.budget as f64, m.vote_average))
        .collect();

    if points.is_empty() {
        let area = area.titled("Budget vs Rating", ("sans-serif", 24))?;
        let (w, h) = area.dim_in_pixel();
        let style = TextStyle::from(("sans-serif", 20).into_font())
            .color(&COLOR_SLATE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw_text("No budget data available", &style, (w as i32 / 2, h as i32 / 2))?;
        return Ok(());
    }

    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption("Budget vs Rating", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((min * 0.5..max * 2.0).log_scale(), 0.0..10.0)?;

    chart
        .configure_mesh()
        .x_desc("Budget (USD, log scale)")
        .y_desc("Vote average")
        .x_label_formatter(&|b| format!("{:.0e}", b))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(budget, rating)| Circle::new((budget, rating), 4, COLOR_EMERALD.mix(0.7).filled())),
    )?;

    Ok(())
}

fn draw_language_pie(area: &Panel, languages: &[LanguageCount]) -> std::result::Result<(), Box<dyn Error>> {
    let area = area.titled("Original Language", ("sans-serif", 24))?;
    let slices = pie_slices(languages, MAX_PIE_SLICES);

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = w.min(h) as f64 * 0.35;
    let label_style = TextStyle::from(("sans-serif", 15).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    // Start at twelve o'clock and go clockwise
    let mut start_angle = -90.0;
    for (i, slice) in slices.iter().enumerate() {
        let sweep_angle = slice.fraction * 360.0;
        let steps = ((sweep_angle / 2.0).ceil() as usize).max(1);

        let mut points = vec![center];
        for s in 0..=steps {
            let rad = (start_angle + sweep_angle * s as f64 / steps as f64).to_radians();
            points.push((
                center.0 + (radius * rad.cos()) as i32,
                center.1 + (radius * rad.sin()) as i32,
            ));
        }
        let color = PIE_COLORS[i % PIE_COLORS.len()];
        area.draw(&Polygon::new(points, color.filled()))?;

        let mid = (start_angle + sweep_angle / 2.0).to_radians();
        let label_pos = (
            center.0 + (radius * 1.2 * mid.cos()) as i32,
            center.1 + (radius * 1.2 * mid.sin()) as i32,
        );
        area.draw_text(
            &format!("{} {:.1}%", slice.label, slice.fraction * 100.0),
            &label_style,
            label_pos,
        )?;

        start_angle += sweep_angle;
    }

    Ok(())
}

fn draw_panel(movies: &[MovieRecord], output_file: &Path) -> std::result::Result<(), Box<dyn Error>> {
    let ratings: Vec<f64> = movies.iter().map(|m| m.vote_average).collect();
    let popularity: Vec<f64> = movies.iter().map(|m| m.popularity).collect();
    let languages = language_frequencies(movies);

    let root = BitMapBackend::new(output_file, (1600, 1200)).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 2));
    draw_rating_histogram(&areas[0], &ratings)?;
    draw_popularity_boxplot(&areas[1], &popularity)?;
    draw_budget_scatter(&areas[2], movies)?;
    draw_language_pie(&areas[3], &languages)?;

    root.present()?;
    Ok(())
}

/// Renders the 2x2 overview panel (ratings, popularity, budget vs rating,
/// languages) to `output_file`. An empty collection renders nothing.
pub fn render_panel(movies: &[MovieRecord], output_file: &Path) -> Result<PanelOutcome> {
    if movies.is_empty() {
        log::warn!("No movies to visualize, skipping chart panel");
        println!("No movies to visualize.");
        return Ok(PanelOutcome::Skipped);
    }

    draw_panel(movies, output_file).map_err(|e| AnalyzerError::render("movie panel", e))?;
    log::info!("Chart panel saved to {}", output_file.display());
    Ok(PanelOutcome::Rendered(output_file.to_path_buf()))
}
