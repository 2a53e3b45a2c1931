//! Run configuration. Defaults, then `CHESSLENS_*` environment overrides;
//! the binary applies command line flags on top.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

pub const DEFAULT_OUTPUT_DIR: &str = "chess_analysis_results";
pub const DEFAULT_TOP_OPENINGS: usize = 10;
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// How many opening families the win-rate table keeps.
    pub top_openings: usize,
    pub histogram_bins: usize,
    pub render_charts: bool,
    pub output_format: OutputFormat,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            input: input.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            top_openings: DEFAULT_TOP_OPENINGS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            render_charts: cfg!(feature = "charts"),
            output_format: OutputFormat::Text,
        }
    }

    /// Build from process environment. The input path may be empty here and
    /// supplied later by the caller.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup<F>(get: F) -> PipelineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = PipelineConfig::new(get("CHESSLENS_INPUT").unwrap_or_default());
        if let Some(dir) = get("CHESSLENS_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(v) = get("CHESSLENS_TOP_OPENINGS") {
            cfg.top_openings = parse_count("CHESSLENS_TOP_OPENINGS", &v)?;
        }
        if let Some(v) = get("CHESSLENS_HIST_BINS") {
            cfg.histogram_bins = parse_count("CHESSLENS_HIST_BINS", &v)?;
        }
        if let Some(v) = get("CHESSLENS_CHARTS") {
            cfg.render_charts = !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no");
        }
        if let Some(v) = get("CHESSLENS_OUTPUT") {
            cfg.output_format = OutputFormat::parse(&v)
                .ok_or_else(|| PipelineError::Config(format!("CHESSLENS_OUTPUT: unknown format '{}'", v)))?;
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(PipelineError::Config("no input file given".into()));
        }
        if self.top_openings == 0 {
            return Err(PipelineError::Config("top_openings must be at least 1".into()));
        }
        if self.histogram_bins == 0 {
            return Err(PipelineError::Config("histogram_bins must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_count(key: &str, v: &str) -> PipelineResult<usize> {
    v.trim()
        .parse::<usize>()
        .map_err(|_| PipelineError::Config(format!("{}: expected a positive integer, got '{}'", key, v)))
}
