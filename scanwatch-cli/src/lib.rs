//! Scanwatch CLI
//!
//! Command-line front end for scanner monitoring, accountability reports
//! and triangulation checks.
//!
//! # Usage
//!
//! ```bash
//! # Monitor continuously with ./config.json (created on first run)
//! scanwatch start
//!
//! # Three cycles, data under /var/lib/scanwatch
//! scanwatch start --cycles 3 --data-dir /var/lib/scanwatch
//!
//! # Report on one officer
//! scanwatch report --officer 123 --output officer_123.json
//!
//! # Smoke-test the pipeline
//! scanwatch test
//!
//! # Triangulate a MAC against the demo stations
//! scanwatch triangulate --mac 00:1A:2B:3C:4D:5E
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod commands;

/// Scanwatch Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "scanwatch")]
#[command(author, version, about = "Police scanner accountability system")]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start continuous monitoring
    Start(StartArgs),

    /// Generate an accountability report
    Report(ReportArgs),

    /// Run one monitoring cycle and check each stage
    Test(TestArgs),

    /// Triangulate a MAC address against the demo stations
    Triangulate(TriangulateArgs),
}

/// Arguments for the start command
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Stop after this many cycles (runs until interrupted if omitted)
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Root of the logs/ and data/ directories
    #[arg(short, long, default_value = ".")]
    pub data_dir: PathBuf,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Specific officer ID
    #[arg(long)]
    pub officer: Option<String>,

    /// Output file path (prints to stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, default_value = ".")]
    pub data_dir: PathBuf,
}

/// Arguments for the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    #[arg(short, long, default_value = ".")]
    pub data_dir: PathBuf,
}

/// Arguments for the triangulate command
#[derive(Args, Debug)]
pub struct TriangulateArgs {
    /// MAC address to triangulate
    #[arg(long)]
    pub mac: String,
}
