//! Global arguments for the CLI.

use crate::flags::{BitcoinArgs, MirrorArgs};
use btc_mirror_cli::LogArgs;
use clap::Parser;

/// Global arguments for the CLI.
#[derive(Parser, Default, Clone, Debug)]
pub struct GlobalArgs {
    /// Logging arguments.
    #[command(flatten)]
    pub log_args: LogArgs,
    /// Bitcoin RPC arguments.
    #[command(flatten)]
    pub bitcoin: BitcoinArgs,
    /// Destination chain arguments.
    #[command(flatten)]
    pub mirror: MirrorArgs,
}
