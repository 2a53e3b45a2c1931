//!
//! chesslens report formatting
//! ---------------------------
//! Converts the derived frame and the core summaries into the tables, charts and
//! console findings that leave the process. The one computation that lives here
//! besides simple counts is the per-opening white win rate, a grouped mean of a
//! 0/1 indicator over `Result == "1-0"`.

pub mod charts;
pub mod histogram;
pub mod writer;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{count_by, sort_by_keys, PlayingPatterns};
use crate::derive::{date_from_epoch_days, DerivedGames, DATE, OPENING_FAMILY, STRENGTH_CATEGORY, TIME_FORMAT};
use crate::error::{PipelineResult, PipelineWarning};
use crate::schema::{OPENING, RESULT, WHITE_ELO};

pub use histogram::{HistogramBin, RatingHistogram};

pub const COUNT_COLUMN: &str = "count";
pub const GAMES_COUNT_COLUMN: &str = "games_count";
pub const WHITE_WIN_RATE_COLUMN: &str = "white_win_rate";
pub const WHITE_WIN: &str = "1-0";

/// Every table and series the writers and renderers consume.
#[derive(Debug, Clone)]
pub struct Report {
    /// `StrengthCategory`, `count`
    pub strength_distribution: DataFrame,
    /// `OpeningFamily`, `games_count`, `white_win_rate` (top N by games)
    pub opening_analysis: DataFrame,
    /// `TimeFormat`, `count`
    pub time_control_analysis: DataFrame,
    /// `Result`, `count`
    pub outcome_analysis: DataFrame,
    pub rating_histogram: RatingHistogram,
    pub opening_patterns: DataFrame,
    pub time_patterns: DataFrame,
}

impl Report {
    /// Tables in the order they are written, keyed by file stem.
    pub fn tables(&self) -> [(&'static str, &DataFrame); 6] {
        [
            ("strength_distribution", &self.strength_distribution),
            ("opening_analysis", &self.opening_analysis),
            ("time_control_analysis", &self.time_control_analysis),
            ("outcome_analysis", &self.outcome_analysis),
            ("opening_patterns", &self.opening_patterns),
            ("time_patterns", &self.time_patterns),
        ]
    }

    pub fn warnings(&self) -> Vec<PipelineWarning> {
        self.tables()
            .iter()
            .filter(|(_, df)| df.height() == 0)
            .map(|(name, _)| PipelineWarning::EmptyResult { table: name.to_string() })
            .collect()
    }
}

/// Row counts per value of `key`, ordered by key.
pub fn distribution(games: &DerivedGames, key: &str) -> PipelineResult<DataFrame> {
    let lf = count_by(games.lazy(), &[key], COUNT_COLUMN);
    Ok(sort_by_keys(lf, &[(key, false)]).collect()?)
}

/// Most played opening families with the share of games white won.
/// Equal game counts are ordered by family name.
pub fn opening_success(games: &DerivedGames, top: usize) -> PipelineResult<DataFrame> {
    let white_won = when(col(RESULT).eq(lit(WHITE_WIN)))
        .then(lit(1.0))
        .otherwise(lit(0.0));
    let lf = games
        .lazy()
        .group_by([col(OPENING_FAMILY)])
        .agg([
            len().cast(DataType::Int64).alias(GAMES_COUNT_COLUMN),
            white_won.mean().alias(WHITE_WIN_RATE_COLUMN),
        ]);
    let df = sort_by_keys(lf, &[(GAMES_COUNT_COLUMN, true), (OPENING_FAMILY, false)])
        .limit(top as IdxSize)
        .collect()?;
    Ok(df)
}

pub fn build_report(
    games: &DerivedGames,
    patterns: &PlayingPatterns,
    top_openings: usize,
    histogram_bins: usize,
) -> PipelineResult<Report> {
    let report = Report {
        strength_distribution: distribution(games, STRENGTH_CATEGORY)?,
        opening_analysis: opening_success(games, top_openings)?,
        time_control_analysis: distribution(games, TIME_FORMAT)?,
        outcome_analysis: distribution(games, RESULT)?,
        rating_histogram: RatingHistogram::from_column(games.frame().column(WHITE_ELO)?, histogram_bins)?,
        opening_patterns: patterns.opening_patterns.clone(),
        time_patterns: patterns.time_patterns.clone(),
    };
    debug!(
        target: "chesslens::report",
        "report: strength={} openings={} time_formats={} outcomes={} bins={}",
        report.strength_distribution.height(),
        report.opening_analysis.height(),
        report.time_control_analysis.height(),
        report.outcome_analysis.height(),
        report.rating_histogram.bins.len()
    );
    Ok(report)
}

/// Headline numbers printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyFindings {
    pub total_games: u64,
    pub unique_openings: u64,
    /// Mean WhiteElo rounded to the nearest integer, halves to even; `None` without games.
    pub average_rating: Option<i64>,
    pub first_game_date: Option<NaiveDate>,
    pub last_game_date: Option<NaiveDate>,
}

pub fn key_findings(games: &DerivedGames) -> PipelineResult<KeyFindings> {
    let df = games.frame();
    let mean = df
        .column(WHITE_ELO)?
        .cast(&DataType::Float64)?
        .f64()?
        .mean();
    let days = df.column(DATE)?.cast(&DataType::Int32)?;
    let days = days.i32()?;
    Ok(KeyFindings {
        total_games: df.height() as u64,
        unique_openings: df.column(OPENING)?.n_unique()? as u64,
        average_rating: mean.map(|m| m.round_ties_even() as i64),
        first_game_date: days.min().and_then(date_from_epoch_days),
        last_game_date: days.max().and_then(date_from_epoch_days),
    })
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
