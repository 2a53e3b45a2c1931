//! Feature derivation.
//!
//! Four columns are attached to a validated game frame, each a pure function of
//! existing columns:
//!
//! - `StrengthCategory` from `WhiteElo` (ordered threshold rules, first match wins)
//! - `OpeningFamily`: `Opening` up to the first ':'
//! - `Date`: `UTCDate` parsed as `%Y.%m.%d`, null when unparsable
//! - `TimeFormat` from `TimeControl` (ordered marker rules, first match wins)
//!
//! The derived frame is materialized once and shared read-only afterwards.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PipelineResult;
use crate::schema::{GameRecord, ValidatedGames, OPENING, TIME_CONTROL, UTC_DATE, WHITE_ELO};

pub const STRENGTH_CATEGORY: &str = "StrengthCategory";
pub const OPENING_FAMILY: &str = "OpeningFamily";
pub const DATE: &str = "Date";
pub const TIME_FORMAT: &str = "TimeFormat";

pub const UTC_DATE_FORMAT: &str = "%Y.%m.%d";
const UTC_DATE_SHAPE: &str = r"^\d{4}\.\d{2}\.\d{2}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrengthCategory {
    Beginner,
    Club,
    Expert,
    Master,
}

/// Inclusive lower bounds, highest first. Anything below the last bound is `Beginner`.
pub const STRENGTH_RULES: [(i32, StrengthCategory); 3] = [
    (2400, StrengthCategory::Master),
    (2000, StrengthCategory::Expert),
    (1600, StrengthCategory::Club),
];

impl StrengthCategory {
    pub const FALLBACK: StrengthCategory = StrengthCategory::Beginner;

    pub fn classify(white_elo: i32) -> Self {
        STRENGTH_RULES
            .iter()
            .find(|(min, _)| white_elo >= *min)
            .map(|(_, cat)| *cat)
            .unwrap_or(Self::FALLBACK)
    }

    pub fn label(self) -> &'static str {
        match self {
            StrengthCategory::Beginner => "Beginner",
            StrengthCategory::Club => "Club",
            StrengthCategory::Expert => "Expert",
            StrengthCategory::Master => "Master",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Beginner" => Some(StrengthCategory::Beginner),
            "Club" => Some(StrengthCategory::Club),
            "Expert" => Some(StrengthCategory::Expert),
            "Master" => Some(StrengthCategory::Master),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeFormat {
    Increment,
    Tournament,
    Standard,
}

/// Substring markers in `TimeControl`, checked in order.
pub const TIME_FORMAT_RULES: [(&str, TimeFormat); 2] = [
    ("+", TimeFormat::Increment),
    ("|", TimeFormat::Tournament),
];

impl TimeFormat {
    pub const FALLBACK: TimeFormat = TimeFormat::Standard;

    pub fn classify(time_control: Option<&str>) -> Self {
        let Some(tc) = time_control else { return Self::FALLBACK };
        TIME_FORMAT_RULES
            .iter()
            .find(|(marker, _)| tc.contains(marker))
            .map(|(_, tf)| *tf)
            .unwrap_or(Self::FALLBACK)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeFormat::Increment => "Increment",
            TimeFormat::Tournament => "Tournament",
            TimeFormat::Standard => "Standard",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Increment" => Some(TimeFormat::Increment),
            "Tournament" => Some(TimeFormat::Tournament),
            "Standard" => Some(TimeFormat::Standard),
            _ => None,
        }
    }
}

/// Fold the rules from the back so the first rule ends up outermost.
pub fn strength_category_expr() -> Expr {
    STRENGTH_RULES
        .iter()
        .rev()
        .fold(lit(StrengthCategory::FALLBACK.label()), |acc, (min, cat)| {
            when(col(WHITE_ELO).gt_eq(lit(*min))).then(lit(cat.label())).otherwise(acc)
        })
}

/// A null `TimeControl` never matches a marker and lands on the fallback.
pub fn time_format_expr() -> Expr {
    TIME_FORMAT_RULES
        .iter()
        .rev()
        .fold(lit(TimeFormat::FALLBACK.label()), |acc, (marker, tf)| {
            when(col(TIME_CONTROL).str().contains_literal(lit(*marker)).fill_null(lit(false)))
                .then(lit(tf.label()))
                .otherwise(acc)
        })
}

pub fn opening_family_expr() -> Expr {
    col(OPENING).str().extract(lit(r"^[^:]*"), 0)
}

/// `%m`/`%d` also accept single digits, so the fixed-width shape is checked first.
pub fn date_expr() -> Expr {
    let parsed = col(UTC_DATE).str().to_date(StrptimeOptions {
        format: Some(UTC_DATE_FORMAT.into()),
        strict: false,
        exact: true,
        cache: true,
    });
    let well_formed = col(UTC_DATE)
        .str()
        .contains(lit(UTC_DATE_SHAPE), false)
        .fill_null(lit(false));
    when(well_formed).then(parsed).otherwise(lit(NULL).cast(DataType::Date))
}

/// Attach the derived columns to a lazy game frame.
pub fn with_derived_columns(lf: LazyFrame) -> LazyFrame {
    lf.with_columns([
        strength_category_expr().alias(STRENGTH_CATEGORY),
        opening_family_expr().alias(OPENING_FAMILY),
        date_expr().alias(DATE),
        time_format_expr().alias(TIME_FORMAT),
    ])
}

/// Validated games plus derived columns, materialized once.
#[derive(Debug, Clone)]
pub struct DerivedGames {
    df: DataFrame,
}

impl DerivedGames {
    pub fn frame(&self) -> &DataFrame { &self.df }

    pub fn height(&self) -> usize { self.df.height() }

    /// Fresh lazy plan over the materialized frame. Cloning a frame only bumps
    /// the column reference counts.
    pub fn lazy(&self) -> LazyFrame { self.df.clone().lazy() }

    pub fn records(&self) -> PipelineResult<Vec<DerivedGame>> {
        let base = GameRecord::from_frame(&self.df)?;
        let strength = self.df.column(STRENGTH_CATEGORY)?.str()?;
        let family = self.df.column(OPENING_FAMILY)?.str()?;
        let time_format = self.df.column(TIME_FORMAT)?.str()?;
        let dates = self.df.column(DATE)?.cast(&DataType::Int32)?;
        let dates = dates.i32()?;

        let mut out = Vec::with_capacity(base.len());
        for (i, game) in base.into_iter().enumerate() {
            out.push(DerivedGame {
                strength_category: strength
                    .get(i)
                    .and_then(StrengthCategory::from_label)
                    .unwrap_or(StrengthCategory::FALLBACK),
                opening_family: family.get(i).map(|s| s.to_string()),
                date: dates.get(i).and_then(date_from_epoch_days),
                time_format: time_format
                    .get(i)
                    .and_then(TimeFormat::from_label)
                    .unwrap_or(TimeFormat::FALLBACK),
                game,
            });
        }
        Ok(out)
    }
}

/// Row view of a derived game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedGame {
    pub game: GameRecord,
    pub strength_category: StrengthCategory,
    pub opening_family: Option<String>,
    pub date: Option<NaiveDate>,
    pub time_format: TimeFormat,
}

pub fn derive_features(games: &ValidatedGames) -> PipelineResult<DerivedGames> {
    debug!(target: "chesslens::derive", "deriving features for {} games", games.height());
    let df = with_derived_columns(games.lazy()).collect()?;
    let unparsed = df.column(DATE)?.null_count();
    if unparsed > 0 {
        debug!(target: "chesslens::derive", "{} games have no parsable UTCDate", unparsed);
    }
    info!(target: "chesslens::derive", "Processed {} games", crate::cli::thousands(df.height() as u64));
    Ok(DerivedGames { df })
}

/// Polars stores dates as days since 1970-01-01.
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

#[cfg(test)]
#[path = "derive_tests.rs"]
mod derive_tests;
