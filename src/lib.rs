pub mod aggregate;
pub mod cli;
pub mod config;
pub mod derive;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod schema;

#[cfg(test)]
mod test_fixtures;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult, PipelineWarning};
pub use pipeline::{run, RunSummary};

// Test-only printing helper: expands to eprintln! during tests and debug builds.
// Usage: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In release builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
