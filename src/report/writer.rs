//! CSV persistence of the report tables. File names are fixed per table and
//! writes are deterministic for identical frames.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::report::Report;

pub fn ensure_output_dir(dir: &Path) -> PipelineResult<()> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

/// Write one table as `<dir>/<stem>.csv` with a header row, also when empty.
pub fn write_table(dir: &Path, stem: &str, df: &DataFrame) -> PipelineResult<PathBuf> {
    let path = dir.join(format!("{}.csv", stem));
    let file = File::create(&path).map_err(|e| PipelineError::io(&path, e))?;
    let mut sink = BufWriter::new(file);
    let mut out = df.clone();
    CsvWriter::new(&mut sink)
        .include_header(true)
        .finish(&mut out)?;
    sink.flush().map_err(|e| PipelineError::io(&path, e))?;
    if out.height() == 0 {
        warn!(target: "chesslens::report", "'{}' has no rows; wrote header only", stem);
    }
    debug!(target: "chesslens::report", "wrote {} rows to {}", out.height(), path.display());
    Ok(path)
}

/// Write every report table into `dir`, creating it if needed.
pub fn write_report(dir: &Path, report: &Report) -> PipelineResult<Vec<PathBuf>> {
    ensure_output_dir(dir)?;
    report
        .tables()
        .iter()
        .map(|(stem, df)| write_table(dir, stem, df))
        .collect()
}
