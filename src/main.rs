use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use chesslens::config::{OutputFormat, PipelineConfig};

/// Analyze a CSV of chess games: player strength, openings, time controls
/// and outcomes, written as CSV tables and PNG charts.
#[derive(Parser, Debug)]
#[command(name = "chesslens", version, about)]
struct Cli {
    /// Game file (CSV with header row). Falls back to CHESSLENS_INPUT.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Directory for tables and charts.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Opening families kept in the win-rate table.
    #[arg(long, value_name = "N")]
    top_openings: Option<usize>,

    /// Bins in the rating histogram.
    #[arg(long, value_name = "N")]
    bins: Option<usize>,

    /// Skip PNG charts.
    #[arg(long)]
    no_charts: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply(self, mut cfg: PipelineConfig) -> PipelineConfig {
        if let Some(input) = self.input {
            cfg.input = input;
        }
        if let Some(dir) = self.output_dir {
            cfg.output_dir = dir;
        }
        if let Some(n) = self.top_openings {
            cfg.top_openings = n;
        }
        if let Some(n) = self.bins {
            cfg.histogram_bins = n;
        }
        if self.no_charts {
            cfg.render_charts = false;
        }
        if self.json {
            cfg.output_format = OutputFormat::Json;
        }
        cfg
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "chesslens", "chesslens {} starting: RUST_LOG='{}'", env!("CARGO_PKG_VERSION"), rust_log);

    let cfg = match PipelineConfig::from_env() {
        Ok(cfg) => cli.apply(cfg),
        Err(e) => exit_with(e),
    };
    let format = cfg.output_format;

    match chesslens::run(&cfg) {
        Ok(summary) => chesslens::cli::print_summary(&summary, format),
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: chesslens::PipelineError) -> ! {
    eprintln!("{}", chesslens::cli::fatal_message(&e));
    std::process::exit(e.exit_code());
}
