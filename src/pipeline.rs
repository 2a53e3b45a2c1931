//! One batch run: load, derive, aggregate, write, render. Each stage takes the
//! previous stage's output by reference; nothing is shared between runs.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::aggregate::analyze_playing_patterns;
use crate::config::PipelineConfig;
use crate::derive::derive_features;
use crate::error::{PipelineResult, PipelineWarning};
use crate::report::{build_report, charts, key_findings, writer, KeyFindings, Report};
use crate::schema::load_games;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub findings: KeyFindings,
    /// CSV files, in write order.
    pub tables: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
    pub warnings: Vec<PipelineWarning>,
    pub report: Report,
}

pub fn run(cfg: &PipelineConfig) -> PipelineResult<RunSummary> {
    cfg.validate()?;
    info!(target: "chesslens::pipeline", "Starting Chess Pattern Analysis Pipeline...");

    let validated = load_games(&cfg.input)?;
    let games = derive_features(&validated)?;
    drop(validated);

    let patterns = analyze_playing_patterns(&games)?;
    info!(target: "chesslens::pipeline", "Generating visualizations...");
    let report = build_report(&games, &patterns, cfg.top_openings, cfg.histogram_bins)?;

    let mut warnings = report.warnings();
    for w in &warnings {
        warn!(target: "chesslens::pipeline", "{}", w);
    }

    let tables = writer::write_report(&cfg.output_dir, &report)?;
    let charts = if cfg.render_charts {
        let (written, skipped) = charts::render_all(&cfg.output_dir, &report)?;
        warnings.extend(skipped);
        written
    } else {
        Vec::new()
    };

    let findings = key_findings(&games)?;
    info!(
        target: "chesslens::pipeline",
        "Analysis completed successfully! {} tables and {} charts in {}",
        tables.len(),
        charts.len(),
        cfg.output_dir.display()
    );
    Ok(RunSummary { findings, tables, charts, warnings, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{games_csv, Game};

    fn config_for(dir: &std::path::Path, games: &[Game]) -> PipelineConfig {
        let input = dir.join("games.csv");
        std::fs::write(&input, games_csv(games)).unwrap();
        let mut cfg = PipelineConfig::new(input);
        cfg.output_dir = dir.join("out");
        cfg.render_charts = false;
        cfg
    }

    #[test]
    fn run_writes_every_table() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config_for(
            tmp.path(),
            &[
                Game::new("2450", "Sicilian Defense: Najdorf").time_control("180+2"),
                Game::new("1650", "Queen's Gambit Declined").time_control("40|120"),
                Game::new("1200", "Sicilian Defense").result("0-1"),
            ],
        );
        let summary = run(&cfg).unwrap();
        assert_eq!(summary.tables.len(), 6);
        assert!(summary.tables.iter().all(|p| p.exists()));
        assert!(summary.charts.is_empty());
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.findings.total_games, 3);
        assert_eq!(summary.findings.average_rating, Some(1767));
        assert!(tmp.path().join("out/opening_analysis.csv").exists());
    }

    #[test]
    fn header_only_input_warns_but_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config_for(tmp.path(), &[]);
        let summary = run(&cfg).unwrap();
        assert_eq!(summary.findings.total_games, 0);
        assert_eq!(summary.warnings.len(), 6);
        let text = std::fs::read_to_string(tmp.path().join("out/time_patterns.csv")).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn invalid_config_fails_before_reading() {
        let mut cfg = PipelineConfig::new("does/not/matter.csv");
        cfg.top_openings = 0;
        assert_eq!(run(&cfg).unwrap_err().code_str(), "config");
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = PipelineConfig::new(tmp.path().join("absent.csv"));
        cfg.output_dir = tmp.path().join("out");
        let err = run(&cfg).unwrap_err();
        assert_eq!(err.code_str(), "io");
        assert!(!tmp.path().join("out").exists());
    }
}
