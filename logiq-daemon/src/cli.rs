//! CLI argument definitions for logiq-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// logiq incremental log scanner and anomaly detector.
///
/// Without `--scan` the daemon runs one cycle per `analysis.interval_seconds`
/// until interrupted.
#[derive(Parser, Debug)]
#[command(name = "logiq-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logiq.toml configuration file.
    #[arg(short, long, default_value = "logiq.toml")]
    pub config: PathBuf,

    /// Run a single scan cycle and exit.
    #[arg(long)]
    pub scan: bool,

    /// Generate the anomaly report in `--scan` mode.
    ///
    /// The interval loop always generates reports.
    #[arg(long)]
    pub report: bool,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without scanning.
    #[arg(long)]
    pub validate: bool,
}

/// How the daemon should run after configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Validate the configuration and exit.
    Validate,
    /// One cycle, optionally with a report.
    Once { report: bool },
    /// Repeat cycles on the configured interval.
    Interval,
}

impl DaemonCli {
    /// Resolve the run mode from the parsed flags.
    pub fn run_mode(&self) -> RunMode {
        if self.validate {
            RunMode::Validate
        } else if self.scan {
            RunMode::Once {
                report: self.report,
            }
        } else {
            RunMode::Interval
        }
    }
}
