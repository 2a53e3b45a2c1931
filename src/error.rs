//! Unified pipeline error model.
//! Every stage (schema validation, derivation, aggregation, reporting) returns
//! `PipelineError`; the binary maps it to a message and a process exit code.
//! Non-fatal conditions are reported as `PipelineWarning` instead.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("schema mismatch: missing required column(s): {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("type coercion failed: column '{column}' row {row} value '{value}' is not a valid {expected}")]
    TypeCoercion {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    #[error("io error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("query engine error: {0}")]
    Engine(#[from] PolarsError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("chart '{chart}' could not be rendered: {message}")]
    Chart { chart: String, message: String },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io { path: path.into(), source }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            PipelineError::SchemaMismatch { .. } => "schema_mismatch",
            PipelineError::TypeCoercion { .. } => "type_coercion",
            PipelineError::Io { .. } => "io",
            PipelineError::Engine(_) => "engine",
            PipelineError::Config(_) => "config",
            PipelineError::Chart { .. } => "chart",
        }
    }

    /// Map to a process exit status. Always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::SchemaMismatch { .. } => 2,
            PipelineError::TypeCoercion { .. } => 3,
            PipelineError::Io { .. } => 4,
            PipelineError::Engine(_) => 5,
            PipelineError::Config(_) => 64,
            PipelineError::Chart { .. } => 6,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Conditions that are reported but never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// A summary table has zero groups; it is still written with its header.
    EmptyResult { table: String },
    /// A chart failed to render; the tables are unaffected.
    ChartSkipped { chart: String, message: String },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::EmptyResult { table } => write!(f, "empty_result: '{}' has no groups", table),
            PipelineWarning::ChartSkipped { chart, message } => write!(f, "chart_skipped: '{}': {}", chart, message),
        }
    }
}
