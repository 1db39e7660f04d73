use std::error::Error;
use std::fmt;
use std::path::Path;

use ndarray::Array2;
use ndarray_stats::CorrelationExt;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{AnalyzerError, Result};
use crate::models::MovieRecord;

pub const FIELD_NAMES: [&str; 6] = ["rating", "popularity", "budget", "revenue", "runtime", "roi"];

/// Pairwise Pearson coefficients over [`FIELD_NAMES`], row-major.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    values: Array2<f64>,
    sample_size: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    /// Number of movies the coefficients were computed over.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn labels(&self) -> &'static [&'static str] {
        &FIELD_NAMES
    }
}

fn field_value(movie: &MovieRecord, field: usize) -> f64 {
    match field {
        0 => movie.vote_average,
        1 => movie.popularity,
        2 => movie.budget as f64,
        3 => movie.revenue as f64,
        4 => movie.runtime as f64,
        // only called on movies with a positive budget
        _ => movie.roi().unwrap_or(0.0),
    }
}

/// Correlates the six numeric fields over movies with both a budget and a
/// revenue. Returns `None` when no movie qualifies.
pub fn compute_correlation(movies: &[MovieRecord]) -> Option<CorrelationMatrix> {
    let financed: Vec<&MovieRecord> = movies.iter().filter(|m| m.has_financials()).collect();
    if financed.is_empty() {
        return None;
    }

    // One row per variable, one column per observation
    let n_fields = FIELD_NAMES.len();
    let observations = Array2::from_shape_fn((n_fields, financed.len()), |(field, obs)| {
        field_value(financed[obs], field)
    });

    let mut values = observations.pearson_correlation().ok()?;
    for ((row, col), value) in values.indexed_iter_mut() {
        if row == col {
            *value = 1.0;
        } else if value.is_finite() {
            *value = value.clamp(-1.0, 1.0);
        } else {
            // a constant column has no defined correlation
            *value = f64::NAN;
        }
    }

    Some(CorrelationMatrix {
        values,
        sample_size: financed.len(),
    })
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12}", "")?;
        for label in self.labels() {
            write!(f, "{:>12}", label)?;
        }
        writeln!(f)?;

        for (i, label) in self.labels().iter().enumerate() {
            write!(f, "{:>12}", label)?;
            for j in 0..self.dim() {
                let value = self.get(i, j);
                if value.is_nan() {
                    write!(f, "{:>12}", "n/a")?;
                } else {
                    write!(f, "{:>12.3}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Blue for negative, red for positive, white at zero.
pub(crate) fn diverging_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let v = value.clamp(-1.0, 1.0);
    let fade = (255.0 * (1.0 - v.abs())).round() as u8;
    if v >= 0.0 {
        RGBColor(255, fade, fade)
    } else {
        RGBColor(fade, fade, 255)
    }
}

fn draw_heatmap(matrix: &CorrelationMatrix, output_file: &Path) -> std::result::Result<(), Box<dyn Error>> {
    let n = matrix.dim();
    let labels = matrix.labels();

    let root = BitMapBackend::new(output_file, (900, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    // Integer ranges are inclusive, so 0..n-1 gives exactly n cells
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Correlation Heatmap ({} movies)", matrix.sample_size()),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d((0..n - 1).into_segmented(), (0..n - 1).into_segmented())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .label_style(("sans-serif", 16))
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(idx) if *idx < n => labels[*idx].to_string(),
            _ => String::new(),
        })
        .y_label_formatter(&|y| match y {
            SegmentValue::CenterOf(idx) if *idx < n => labels[n - 1 - *idx].to_string(),
            _ => String::new(),
        })
        .draw()?;

    let annotation = TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    // First field on the top row
    for i in 0..n {
        let y = n - 1 - i;
        for j in 0..n {
            let value = matrix.get(i, j);
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(j), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(j + 1), SegmentValue::Exact(y + 1)),
                ],
                diverging_color(value).filled(),
            )))?;

            let text = if value.is_nan() {
                "n/a".to_string()
            } else {
                format!("{:.2}", value)
            };
            chart.draw_series(std::iter::once(Text::new(
                text,
                (SegmentValue::CenterOf(j), SegmentValue::CenterOf(y)),
                annotation.clone(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

pub fn render_heatmap(matrix: &CorrelationMatrix, output_file: &Path) -> Result<()> {
    draw_heatmap(matrix, output_file).map_err(|e| AnalyzerError::render("correlation heatmap", e))?;
    log::info!("Heatmap saved to {}", output_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eda_statistics::tests::movie;
    use proptest::prelude::*;

    #[test]
    fn empty_collection_has_insufficient_data() {
        assert!(compute_correlation(&[]).is_none());
    }

    #[test]
    fn movies_without_budget_or_revenue_are_filtered_out() {
        let movies = vec![
            movie(8.0, 50.0, "en", 0, 3000, 120),
            movie(6.0, 20.0, "fr", 1000, 0, 90),
        ];
        assert!(compute_correlation(&movies).is_none());
    }

    #[test]
    fn perfectly_linear_fields_correlate_to_one() {
        let movies = vec![
            movie(5.0, 10.0, "en", 100, 200, 90),
            movie(6.0, 20.0, "en", 200, 400, 100),
            movie(7.0, 30.0, "en", 300, 600, 110),
        ];
        let matrix = compute_correlation(&movies).unwrap();

        assert_eq!(matrix.sample_size(), 3);
        // rating vs popularity
        assert!((matrix.get(0, 1) - 1.0).abs() < 1e-9);
        // budget vs revenue
        assert!((matrix.get(2, 3) - 1.0).abs() < 1e-9);
        // roi is constant at 1.0, so it has no correlation with anything
        assert!(matrix.get(5, 0).is_nan());
        assert_eq!(matrix.get(5, 5), 1.0);
    }

    #[test]
    fn single_movie_still_has_unit_diagonal() {
        let matrix = compute_correlation(&[movie(7.0, 5.0, "en", 10, 20, 100)]).unwrap();
        for i in 0..matrix.dim() {
            assert_eq!(matrix.get(i, i), 1.0);
        }
    }

    #[test]
    fn display_lists_every_field() {
        let movies = vec![
            movie(5.0, 10.0, "en", 100, 250, 90),
            movie(8.0, 15.0, "en", 300, 400, 130),
        ];
        let table = compute_correlation(&movies).unwrap().to_string();
        for label in FIELD_NAMES {
            assert!(table.contains(label));
        }
        assert_eq!(table.lines().count(), FIELD_NAMES.len() + 1);
    }

    #[test]
    fn diverging_scale_is_white_at_zero() {
        assert_eq!(diverging_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(diverging_color(1.0), RGBColor(255, 0, 0));
        assert_eq!(diverging_color(-1.0), RGBColor(0, 0, 255));
    }

    #[test]
    fn heatmap_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        let movies = vec![
            movie(5.0, 10.0, "en", 100, 250, 90),
            movie(8.0, 15.0, "en", 300, 400, 130),
            movie(6.5, 40.0, "fr", 200, 900, 105),
        ];
        let matrix = compute_correlation(&movies).unwrap();

        render_heatmap(&matrix, &path).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    proptest! {
        #[test]
        fn matrix_is_symmetric_with_unit_diagonal(
            rows in proptest::collection::vec(
                (0.0f64..10.0, 0.0f64..500.0, 1u64..1_000_000, 1u64..5_000_000, 60u32..200),
                1..30,
            )
        ) {
            let movies: Vec<MovieRecord> = rows
                .iter()
                .map(|&(r, p, b, rev, rt)| movie(r, p, "en", b, rev, rt))
                .collect();
            let matrix = compute_correlation(&movies).unwrap();

            for i in 0..matrix.dim() {
                prop_assert!((matrix.get(i, i) - 1.0).abs() < 1e-12);
                for j in 0..matrix.dim() {
                    let (a, b) = (matrix.get(i, j), matrix.get(j, i));
                    prop_assert!((a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-9);
                }
            }
        }
    }
}
