//!
//! chesslens schema validation
//! ---------------------------
//! Turns a delimited source into a typed game frame. The CSV is read with every
//! column as text so that coercion stays under our control:
//!
//! 1. the header must name every column in `GAME_SCHEMA` (extra columns are dropped);
//! 2. integer columns are cast, and a present value that does not parse is an error;
//! 3. absent rating values are filled with 0 as a separate step after the load.
//!
//! The result is a `ValidatedGames` frame with exactly the schema columns, in
//! schema order.

use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::tprintln;

pub const EVENT: &str = "Event";
pub const WHITE: &str = "White";
pub const BLACK: &str = "Black";
pub const RESULT: &str = "Result";
pub const UTC_DATE: &str = "UTCDate";
pub const UTC_TIME: &str = "UTCTime";
pub const WHITE_ELO: &str = "WhiteElo";
pub const BLACK_ELO: &str = "BlackElo";
pub const WHITE_RATING_DIFF: &str = "WhiteRatingDiff";
pub const BLACK_RATING_DIFF: &str = "BlackRatingDiff";
pub const ECO: &str = "ECO";
pub const OPENING: &str = "Opening";
pub const TIME_CONTROL: &str = "TimeControl";
pub const TERMINATION: &str = "Termination";

/// Logical column kinds of the game schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

impl ColumnKind {
    pub fn dtype(self) -> DataType {
        match self {
            ColumnKind::Text => DataType::String,
            ColumnKind::Integer => DataType::Int32,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Text => "string",
            ColumnKind::Integer => "integer",
        }
    }
}

pub const GAME_SCHEMA: [(&str, ColumnKind); 14] = [
    (EVENT, ColumnKind::Text),
    (WHITE, ColumnKind::Text),
    (BLACK, ColumnKind::Text),
    (RESULT, ColumnKind::Text),
    (UTC_DATE, ColumnKind::Text),
    (UTC_TIME, ColumnKind::Text),
    (WHITE_ELO, ColumnKind::Integer),
    (BLACK_ELO, ColumnKind::Integer),
    (WHITE_RATING_DIFF, ColumnKind::Integer),
    (BLACK_RATING_DIFF, ColumnKind::Integer),
    (ECO, ColumnKind::Text),
    (OPENING, ColumnKind::Text),
    (TIME_CONTROL, ColumnKind::Text),
    (TERMINATION, ColumnKind::Text),
];

/// Columns whose absent values become 0 after the load.
pub const RATING_COLUMNS: [&str; 4] = [WHITE_ELO, BLACK_ELO, WHITE_RATING_DIFF, BLACK_RATING_DIFF];

/// Typed game frame: every schema column present, ratings never null.
#[derive(Debug, Clone)]
pub struct ValidatedGames {
    df: DataFrame,
}

impl ValidatedGames {
    pub fn frame(&self) -> &DataFrame { &self.df }

    pub fn height(&self) -> usize { self.df.height() }

    pub fn lazy(&self) -> LazyFrame { self.df.clone().lazy() }

    pub fn into_frame(self) -> DataFrame { self.df }

    /// Row view of the frame.
    pub fn records(&self) -> PipelineResult<Vec<GameRecord>> {
        GameRecord::from_frame(&self.df)
    }
}

/// One game row with the schema's types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub event: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub utc_date: Option<String>,
    pub utc_time: Option<String>,
    pub white_elo: i32,
    pub black_elo: i32,
    pub white_rating_diff: i32,
    pub black_rating_diff: i32,
    pub eco: Option<String>,
    pub opening: Option<String>,
    pub time_control: Option<String>,
    pub termination: Option<String>,
}

impl GameRecord {
    pub(crate) fn from_frame(df: &DataFrame) -> PipelineResult<Vec<GameRecord>> {
        let text = |name: &str| -> PipelineResult<Vec<Option<String>>> {
            Ok(df.column(name)?.str()?.into_iter().map(|v| v.map(|s| s.to_string())).collect())
        };
        let int = |name: &str| -> PipelineResult<Vec<i32>> {
            Ok(df.column(name)?.i32()?.into_iter().map(|v| v.unwrap_or(0)).collect())
        };
        let (event, white, black, result) = (text(EVENT)?, text(WHITE)?, text(BLACK)?, text(RESULT)?);
        let (utc_date, utc_time) = (text(UTC_DATE)?, text(UTC_TIME)?);
        let (white_elo, black_elo) = (int(WHITE_ELO)?, int(BLACK_ELO)?);
        let (white_diff, black_diff) = (int(WHITE_RATING_DIFF)?, int(BLACK_RATING_DIFF)?);
        let (eco, opening, time_control, termination) = (text(ECO)?, text(OPENING)?, text(TIME_CONTROL)?, text(TERMINATION)?);

        let mut out = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            out.push(GameRecord {
                event: event[i].clone(),
                white: white[i].clone(),
                black: black[i].clone(),
                result: result[i].clone(),
                utc_date: utc_date[i].clone(),
                utc_time: utc_time[i].clone(),
                white_elo: white_elo[i],
                black_elo: black_elo[i],
                white_rating_diff: white_diff[i],
                black_rating_diff: black_diff[i],
                eco: eco[i].clone(),
                opening: opening[i].clone(),
                time_control: time_control[i].clone(),
                termination: termination[i].clone(),
            });
        }
        Ok(out)
    }
}

/// Read and validate the game file at `path`.
pub fn load_games(path: &Path) -> PipelineResult<ValidatedGames> {
    info!(target: "chesslens::schema", "Processing data from: {}", path.display());
    let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    read_games(bytes)
}

/// Read and validate CSV bytes (header row required).
pub fn read_games(bytes: Vec<u8>) -> PipelineResult<ValidatedGames> {
    check_utf8(&bytes)?;
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish();
    let raw = match raw {
        Ok(df) => df,
        // A zero-byte file has no header at all; report it as missing every column.
        Err(PolarsError::NoData(_)) => DataFrame::empty(),
        Err(e) => return Err(e.into()),
    };
    debug!(target: "chesslens::schema", "raw frame: rows={} cols={}", raw.height(), raw.width());
    validate_frame(raw)
}

/// Text fields must be UTF-8. The offending field is located by a quote-aware
/// scan so the error names the same row and column a coercion failure would.
fn check_utf8(bytes: &[u8]) -> PipelineResult<()> {
    let offset = match std::str::from_utf8(bytes) {
        Ok(_) => return Ok(()),
        Err(e) => e.valid_up_to(),
    };
    let (mut row, mut field, mut field_start, mut in_quotes) = (0usize, 0usize, 0usize, false);
    for (i, b) in bytes[..offset].iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                field += 1;
                field_start = i + 1;
            }
            b'\n' if !in_quotes => {
                row += 1;
                field = 0;
                field_start = i + 1;
            }
            _ => {}
        }
    }
    let field_end = bytes[offset..]
        .iter()
        .position(|b| *b == b',' || *b == b'\n')
        .map_or(bytes.len(), |p| offset + p);
    let value = String::from_utf8_lossy(&bytes[field_start..field_end])
        .trim_end_matches('\r')
        .trim_matches('"')
        .to_string();
    let header_end = bytes.iter().position(|b| *b == b'\n').unwrap_or(bytes.len());
    let column = String::from_utf8_lossy(&bytes[..header_end.min(offset)])
        .split(',')
        .nth(field)
        .filter(|_| row > 0)
        .map(|c| c.trim_end_matches('\r').trim_matches('"').to_string())
        .unwrap_or_else(|| format!("column {}", field + 1));
    Err(PipelineError::TypeCoercion { column, row, value, expected: "UTF-8 text" })
}

/// Enforce the game schema on an already loaded frame.
pub fn validate_frame(raw: DataFrame) -> PipelineResult<ValidatedGames> {
    check_columns(&raw)?;
    for (name, kind) in GAME_SCHEMA.iter() {
        if *kind == ColumnKind::Integer {
            check_coercible(&raw, name, *kind)?;
        }
    }

    let projection: Vec<Expr> = GAME_SCHEMA
        .iter()
        .map(|(name, kind)| col(*name).cast(kind.dtype()))
        .collect();
    let fill: Vec<Expr> = RATING_COLUMNS
        .iter()
        .map(|name| col(*name).fill_null(lit(0i32)))
        .collect();
    let df = raw.lazy().select(projection).with_columns(fill).collect()?;
    tprintln!("[SCHEMA] validated frame: {:?}", df.schema());
    Ok(ValidatedGames { df })
}

fn check_columns(raw: &DataFrame) -> PipelineResult<()> {
    let present: Vec<&str> = raw.get_column_names().iter().map(|c| c.as_str()).collect();
    let missing: Vec<String> = GAME_SCHEMA
        .iter()
        .filter(|(name, _)| !present.contains(name))
        .map(|(name, _)| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch { missing })
    }
}

/// A value that is present in the source must survive the cast; nulls are
/// allowed through and handled by the fill step.
fn check_coercible(raw: &DataFrame, name: &str, kind: ColumnKind) -> PipelineResult<()> {
    let source = raw.column(name)?;
    if source.dtype() != &DataType::String {
        return Ok(());
    }
    let cast = source.cast(&kind.dtype())?;
    if cast.null_count() == source.null_count() {
        return Ok(());
    }
    let bad = source
        .str()?
        .into_iter()
        .zip(cast.i32()?.into_iter())
        .enumerate()
        .find_map(|(i, (raw, parsed))| match (raw, parsed) {
            (Some(v), None) => Some((i + 1, v.to_string())),
            _ => None,
        });
    let (row, value) = bad.unwrap_or_default();
    Err(PipelineError::TypeCoercion {
        column: name.to_string(),
        row,
        value,
        expected: kind.label(),
    })
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod schema_tests;
