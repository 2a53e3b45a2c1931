//! PNG charts for the report (plotters bitmap backend).
//!
//! Charts are presentation only: a chart that fails to render (for example
//! because no system font is available) is returned as a warning and the run
//! carries on.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, warn};

use crate::derive::{OPENING_FAMILY, STRENGTH_CATEGORY, TIME_FORMAT};
use crate::error::{PipelineError, PipelineResult, PipelineWarning};
use crate::report::{Report, COUNT_COLUMN, WHITE_WIN_RATE_COLUMN};
use crate::schema::RESULT;

pub const STRENGTH_CHART: &str = "strength_distribution.png";
pub const OPENING_CHART: &str = "opening_success.png";
pub const TIME_CONTROL_CHART: &str = "time_control_dist.png";
pub const RATING_CHART: &str = "rating_distribution.png";
pub const OUTCOME_CHART: &str = "game_outcomes.png";

/// Labels with one value each, ready to plot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// Pull a label column and a numeric column out of a summary table.
    /// Null labels are shown as "(none)".
    pub fn from_frame(df: &DataFrame, label: &str, value: &str) -> PipelineResult<Self> {
        let labels = df
            .column(label)?
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or("(none)").to_string())
            .collect();
        let values = df
            .column(value)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();
        Ok(ChartSeries { labels, values })
    }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn max_value(&self) -> f64 {
        self.values.iter().cloned().fold(0.0, f64::max)
    }
}

pub fn opening_chart_title(shown: usize) -> String {
    format!("Top {} Openings White Win Rate", shown)
}

/// Render every chart into `dir`. Returns the written paths and a warning per
/// chart that could not be produced.
pub fn render_all(dir: &Path, report: &Report) -> PipelineResult<(Vec<PathBuf>, Vec<PipelineWarning>)> {
    let strength = ChartSeries::from_frame(&report.strength_distribution, STRENGTH_CATEGORY, COUNT_COLUMN)?;
    let openings = ChartSeries::from_frame(&report.opening_analysis, OPENING_FAMILY, WHITE_WIN_RATE_COLUMN)?;
    let time_formats = ChartSeries::from_frame(&report.time_control_analysis, TIME_FORMAT, COUNT_COLUMN)?;
    let outcomes = ChartSeries::from_frame(&report.outcome_analysis, RESULT, COUNT_COLUMN)?;

    let mut written = Vec::new();
    let mut warnings = Vec::new();
    let mut record = |name: &str, res: PipelineResult<()>| match res {
        Ok(()) => written.push(dir.join(name)),
        Err(e) => {
            warn!(target: "chesslens::report", "skipping chart {}: {}", name, e);
            let message = match e {
                PipelineError::Chart { message, .. } => message,
                other => other.to_string(),
            };
            warnings.push(PipelineWarning::ChartSkipped { chart: name.to_string(), message });
        }
    };

    record(STRENGTH_CHART, render::bar(&dir.join(STRENGTH_CHART), "Distribution of Player Strength Categories", "Strength Category", "Number of Players", &strength));
    record(OPENING_CHART, render::horizontal_bar(&dir.join(OPENING_CHART), &opening_chart_title(openings.labels.len()), "Win Rate", &openings));
    record(TIME_CONTROL_CHART, render::pie(&dir.join(TIME_CONTROL_CHART), "Distribution of Time Control Formats", &time_formats));
    record(RATING_CHART, render::histogram(&dir.join(RATING_CHART), "Distribution of Player Ratings", &report.rating_histogram));
    record(OUTCOME_CHART, render::pie(&dir.join(OUTCOME_CHART), "Distribution of Game Outcomes", &outcomes));

    debug!(target: "chesslens::report", "charts: {} written, {} skipped", written.len(), warnings.len());
    Ok((written, warnings))
}

#[cfg(feature = "charts")]
mod render {
    use std::f64::consts::PI;
    use std::path::Path;

    use plotters::coord::Shift;
    use plotters::prelude::*;

    use super::ChartSeries;
    use crate::error::{PipelineError, PipelineResult};
    use crate::report::RatingHistogram;

    type DrawResult = Result<(), Box<dyn std::error::Error>>;

    fn finish(path: &Path, res: DrawResult) -> PipelineResult<()> {
        res.map_err(|e| PipelineError::Chart {
            chart: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn label_at(labels: &[String], v: &SegmentValue<usize>) -> String {
        match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        }
    }

    pub fn bar(path: &Path, title: &str, x_desc: &str, y_desc: &str, series: &ChartSeries) -> PipelineResult<()> {
        let draw = || -> DrawResult {
            let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
            root.fill(&WHITE)?;
            let n = series.values.len().max(1);
            let top = (series.max_value() * 1.1).max(1.0);
            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 28))
                .margin(15)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d((0..n).into_segmented(), 0f64..top)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(x_desc)
                .y_desc(y_desc)
                .x_label_formatter(&|v: &SegmentValue<usize>| label_at(&series.labels, v))
                .draw()?;
            chart.draw_series(series.values.iter().enumerate().map(|(i, v)| {
                Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                    BLUE.mix(0.7).filled(),
                )
            }))?;
            root.present()?;
            Ok(())
        };
        finish(path, draw())
    }

    pub fn horizontal_bar(path: &Path, title: &str, x_desc: &str, series: &ChartSeries) -> PipelineResult<()> {
        let draw = || -> DrawResult {
            let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
            root.fill(&WHITE)?;
            let n = series.values.len().max(1);
            let right = series.max_value().max(1.0);
            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 28))
                .margin(15)
                .x_label_area_size(50)
                .y_label_area_size(260)
                .build_cartesian_2d(0f64..right, (0..n).into_segmented())?;
            chart
                .configure_mesh()
                .disable_y_mesh()
                .x_desc(x_desc)
                .y_label_formatter(&|v: &SegmentValue<usize>| label_at(&series.labels, v))
                .draw()?;
            chart.draw_series(series.values.iter().enumerate().map(|(i, v)| {
                Rectangle::new(
                    [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
                    GREEN.mix(0.7).filled(),
                )
            }))?;
            root.present()?;
            Ok(())
        };
        finish(path, draw())
    }

    fn draw_pie(area: &DrawingArea<BitMapBackend<'_>, Shift>, series: &ChartSeries) -> DrawResult {
        let total: f64 = series.values.iter().sum();
        if total <= 0.0 {
            return Ok(());
        }
        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = w.min(h) as f64 * 0.35;
        let mut start = -PI / 2.0;
        for (i, (label, v)) in series.labels.iter().zip(series.values.iter()).enumerate() {
            let sweep = v / total * 2.0 * PI;
            let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;
            let mut points = vec![center];
            for s in 0..=steps {
                let a = start + sweep * s as f64 / steps as f64;
                points.push((center.0 + (radius * a.cos()) as i32, center.1 + (radius * a.sin()) as i32));
            }
            area.draw(&Polygon::new(points, Palette99::pick(i).filled()))?;
            let mid = start + sweep / 2.0;
            let at = (center.0 + (radius * 1.12 * mid.cos()) as i32, center.1 + (radius * 1.12 * mid.sin()) as i32);
            area.draw(&Text::new(format!("{} {:.1}%", label, v / total * 100.0), at, ("sans-serif", 18).into_font()))?;
            start += sweep;
        }
        Ok(())
    }

    pub fn pie(path: &Path, title: &str, series: &ChartSeries) -> PipelineResult<()> {
        let draw = || -> DrawResult {
            let root = BitMapBackend::new(path, (1000, 1000)).into_drawing_area();
            root.fill(&WHITE)?;
            let area = root.titled(title, ("sans-serif", 30))?;
            draw_pie(&area, series)?;
            root.present()?;
            Ok(())
        };
        finish(path, draw())
    }

    pub fn histogram(path: &Path, title: &str, hist: &RatingHistogram) -> PipelineResult<()> {
        let draw = || -> DrawResult {
            let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
            root.fill(&WHITE)?;
            let (lo, hi) = match (hist.bins.first(), hist.bins.last()) {
                (Some(first), Some(last)) => (first.start, last.end),
                _ => (0.0, 1.0),
            };
            let top = (hist.max_count() as f64 * 1.1).max(1.0);
            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 28))
                .margin(15)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(lo..hi, 0f64..top)?;
            chart.configure_mesh().x_desc("Rating").y_desc("Frequency").draw()?;
            chart.draw_series(hist.bins.iter().map(|b| {
                Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLUE.mix(0.6).filled())
            }))?;
            root.present()?;
            Ok(())
        };
        finish(path, draw())
    }
}

#[cfg(not(feature = "charts"))]
mod render {
    use std::path::Path;

    use super::ChartSeries;
    use crate::error::{PipelineError, PipelineResult};
    use crate::report::RatingHistogram;

    fn unavailable(path: &Path) -> PipelineResult<()> {
        Err(PipelineError::Chart {
            chart: path.display().to_string(),
            message: "built without the 'charts' feature".into(),
        })
    }

    pub fn bar(path: &Path, _: &str, _: &str, _: &str, _: &ChartSeries) -> PipelineResult<()> { unavailable(path) }
    pub fn horizontal_bar(path: &Path, _: &str, _: &str, _: &ChartSeries) -> PipelineResult<()> { unavailable(path) }
    pub fn pie(path: &Path, _: &str, _: &ChartSeries) -> PipelineResult<()> { unavailable(path) }
    pub fn histogram(path: &Path, _: &str, _: &RatingHistogram) -> PipelineResult<()> { unavailable(path) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_from_summary_table() {
        let df = df!(
            "Result" => [Some("0-1"), Some("1-0"), None],
            "count" => [3i64, 5, 1],
        )
        .unwrap();
        let s = ChartSeries::from_frame(&df, "Result", "count").unwrap();
        assert_eq!(s.labels, vec!["0-1", "1-0", "(none)"]);
        assert_eq!(s.values, vec![3.0, 5.0, 1.0]);
        assert_eq!(s.max_value(), 5.0);
    }

    #[test]
    fn opening_title_follows_table_size() {
        let df = df!(
            "OpeningFamily" => ["Sicilian Defense", "French Defense", "Italian Game"],
            "white_win_rate" => [0.5, 0.4, 0.6],
        )
        .unwrap();
        let s = ChartSeries::from_frame(&df, OPENING_FAMILY, WHITE_WIN_RATE_COLUMN).unwrap();
        assert_eq!(opening_chart_title(s.labels.len()), "Top 3 Openings White Win Rate");
    }

    #[test]
    fn empty_series() {
        let s = ChartSeries::default();
        assert!(s.is_empty());
        assert_eq!(s.max_value(), 0.0);
    }
}
