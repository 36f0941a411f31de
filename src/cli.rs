//! CLI argument parsing for catex

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "catex")]
#[command(version)]
#[command(about = "Catenary measurement exception detection, repeat matching and wear trends", long_about = None)]
pub struct Cli {
    /// Pipeline configuration (TOML); defaults apply when omitted
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format printed to stdout
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect exceptions in one survey
    Generate(GenerateArgs),
    /// Match exception reports of consecutive surveys
    Repeated(RepeatedArgs),
    /// Review unactioned wire wear L2 repeats against their history
    Trend(TrendArgs),
    /// Remaining wire thickness statistics per tension length
    WearSummary(WearSummaryArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// DATAC export (`;`-delimited)
    #[arg(long, value_name = "FILE")]
    pub datac: PathBuf,

    /// Directory holding track_types.csv and the optional zones, spans and landmarks tables
    #[arg(long, value_name = "DIR")]
    pub metadata: PathBuf,

    /// Threshold table (TOML)
    #[arg(long, value_name = "FILE")]
    pub thresholds: PathBuf,

    /// Section code, e.g. LMC or TUM-HUH
    #[arg(long)]
    pub section: String,

    /// Line code; taken from the DATAC LINE column when omitted
    #[arg(long)]
    pub line: Option<String>,

    /// Track direction; taken from the DATAC TRACK column when omitted
    #[arg(long)]
    pub track: Option<String>,

    /// Write one CSV per category into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RepeatedArgs {
    /// Report directories, oldest first
    #[arg(required = true, num_args = 2..=12, value_name = "REPORT_DIR")]
    pub reports: Vec<PathBuf>,

    /// Write repeated_summary.csv and previous.csv into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TrendArgs {
    /// Repeat summary (repeated_summary.csv)
    #[arg(long, value_name = "FILE")]
    pub summary: PathBuf,

    /// Previous-id table (previous.csv)
    #[arg(long, value_name = "FILE")]
    pub previous: PathBuf,

    /// Report directory of the survey in the last Previous column
    #[arg(long, value_name = "DIR")]
    pub nearest: PathBuf,

    /// Report directory of the survey in the column before it
    #[arg(long, value_name = "DIR")]
    pub second: PathBuf,

    /// Older report directories, most recent first (up to 3)
    #[arg(long = "older-report", value_name = "DIR")]
    pub older_reports: Vec<PathBuf>,

    /// Catenary wear exports matching each --older-report, in the same order
    #[arg(long = "older-catenary", value_name = "FILE")]
    pub older_catenary: Vec<PathBuf>,

    /// Write the trend table as CSV to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WearSummaryArgs {
    /// Catenary wear export (CHAINAGE plus four wear channels)
    #[arg(long, value_name = "FILE")]
    pub catenary: PathBuf,

    /// Tension-length spans (spans.csv layout)
    #[arg(long, value_name = "FILE")]
    pub spans: PathBuf,
}
