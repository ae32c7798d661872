//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "stride", version, about = "Daily step tracking CLI")]
pub struct Cli {
    /// Path to config TOML (missing file falls back to defaults)
    #[arg(long, value_name = "FILE", default_value = "etc/stride.toml")]
    pub config: PathBuf,

    /// Log and print as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start tracking in the foreground until interrupted
    Track {
        /// Read the sensor inside the tracking loop instead of a sampler thread
        #[arg(long, action = ArgAction::SetTrue)]
        direct: bool,
        /// Stop automatically after this many seconds (mainly for testing)
        #[arg(long, value_name = "SECS")]
        duration_s: Option<u64>,
    },
    /// Print today's step count
    Steps,
    /// Reset today's step count to zero
    Reset,
    /// Describe the step sensor and the persisted tracking state
    SensorInfo,
    /// Quick health check (sensor presence / store writable)
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}
