//! Logging arguments.

use clap::{ArgAction, Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

/// The log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Full format with timestamps and targets.
    #[default]
    Full,
    /// Compact single-line format.
    Compact,
}

/// Logging arguments shared by every subcommand.
#[derive(Parser, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogArgs {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
    /// Log line format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Full, global = true)]
    pub format: LogFormat,
}

impl LogArgs {
    /// Returns the default level implied by the verbosity count.
    pub const fn level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
