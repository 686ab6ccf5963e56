//! # btc-mirror-cli
//!
//! Utilities shared by the relay binaries: logging setup, help styling and error types.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod backtrace;

mod error;
pub use error::{CliError, CliResult};

pub mod log;
pub use log::{LogArgs, LogFormat};

mod subscriber;
pub use subscriber::init_tracing_subscriber;

mod styles;
pub use styles::cli_styles;
