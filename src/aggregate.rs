//! Grouped summaries over the derived game frame.
//!
//! Each summary is a single lazy plan evaluated by polars. Results are sorted
//! on fixed keys before they are materialized so that two runs over the same
//! input produce identical tables.

use polars::prelude::*;
use tracing::{debug, info};

use crate::derive::{DerivedGames, OPENING_FAMILY, STRENGTH_CATEGORY, TIME_FORMAT};
use crate::error::{PipelineResult, PipelineWarning};
use crate::schema::WHITE_ELO;

pub const COUNT: &str = "Count";
pub const PERCENTAGE: &str = "Percentage";
pub const GAMES_COUNT: &str = "GamesCount";
pub const AVERAGE_RATING: &str = "AverageRating";

const PARTITION_TOTAL: &str = "__partition_total";

/// Sort key: column name and whether it sorts descending.
pub(crate) type SortKey<'a> = (&'a str, bool);

/// Sort by the given keys; nulls last, ties keep their input order.
pub(crate) fn sort_by_keys(lf: LazyFrame, keys: &[SortKey<'_>]) -> LazyFrame {
    if keys.is_empty() {
        return lf;
    }
    let exprs: Vec<Expr> = keys.iter().map(|(name, _)| col(*name)).collect();
    let descending: Vec<bool> = keys.iter().map(|(_, desc)| *desc).collect();
    let nulls_last: Vec<bool> = vec![true; exprs.len()];
    let opts = SortMultipleOptions { descending, nulls_last, maintain_order: true, multithreaded: true, limit: None };
    lf.sort_by_exprs(exprs, opts)
}

/// Row count per group as Int64 under `count_name`.
pub(crate) fn count_by(lf: LazyFrame, keys: &[&str], count_name: &str) -> LazyFrame {
    let by: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    lf.group_by(by).agg([len().cast(DataType::Int64).alias(count_name)])
}

/// Opening preferences by strength: `Count` per (StrengthCategory, OpeningFamily)
/// and `Percentage` of that count within the StrengthCategory partition.
pub fn opening_patterns(games: &DerivedGames) -> PipelineResult<DataFrame> {
    let counts = count_by(games.lazy(), &[STRENGTH_CATEGORY, OPENING_FAMILY], COUNT);
    let totals = counts
        .clone()
        .group_by([col(STRENGTH_CATEGORY)])
        .agg([col(COUNT).sum().alias(PARTITION_TOTAL)]);
    let joined = counts
        .join(totals, [col(STRENGTH_CATEGORY)], [col(STRENGTH_CATEGORY)], JoinArgs::new(JoinType::Left))
        .with_column(
            (col(COUNT).cast(DataType::Float64) / col(PARTITION_TOTAL).cast(DataType::Float64) * lit(100.0))
                .alias(PERCENTAGE),
        )
        .select([col(STRENGTH_CATEGORY), col(OPENING_FAMILY), col(COUNT), col(PERCENTAGE)]);
    let df = sort_by_keys(joined, &[(STRENGTH_CATEGORY, false), (COUNT, true), (OPENING_FAMILY, false)]).collect()?;
    debug!(target: "chesslens::aggregate", "opening_patterns: {} groups", df.height());
    Ok(df)
}

/// Time management: games and mean WhiteElo per (TimeFormat, StrengthCategory).
/// Zero-filled ratings take part in the mean.
pub fn time_patterns(games: &DerivedGames) -> PipelineResult<DataFrame> {
    let lf = games
        .lazy()
        .group_by([col(TIME_FORMAT), col(STRENGTH_CATEGORY)])
        .agg([
            len().cast(DataType::Int64).alias(GAMES_COUNT),
            col(WHITE_ELO).cast(DataType::Float64).mean().alias(AVERAGE_RATING),
        ]);
    let df = sort_by_keys(lf, &[(TIME_FORMAT, false), (STRENGTH_CATEGORY, false)]).collect()?;
    debug!(target: "chesslens::aggregate", "time_patterns: {} groups", df.height());
    Ok(df)
}

/// Both core summaries of one run.
#[derive(Debug, Clone)]
pub struct PlayingPatterns {
    pub opening_patterns: DataFrame,
    pub time_patterns: DataFrame,
}

impl PlayingPatterns {
    pub fn warnings(&self) -> Vec<PipelineWarning> {
        let mut out = Vec::new();
        for (table, df) in [("opening_patterns", &self.opening_patterns), ("time_patterns", &self.time_patterns)] {
            if df.height() == 0 {
                out.push(PipelineWarning::EmptyResult { table: table.to_string() });
            }
        }
        out
    }
}

pub fn analyze_playing_patterns(games: &DerivedGames) -> PipelineResult<PlayingPatterns> {
    info!(target: "chesslens::aggregate", "Analyzing playing patterns...");
    Ok(PlayingPatterns {
        opening_patterns: opening_patterns(games)?,
        time_patterns: time_patterns(games)?,
    })
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod aggregate_tests;
