//! Contains the submitter CLI.

use crate::{
    commands::{StatusCommand, SubmitCommand},
    flags::GlobalArgs,
};
use anyhow::Result;
use btc_mirror_cli::{cli_styles, init_tracing_subscriber};
use clap::{Parser, Subcommand};

/// Subcommands for the CLI.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Runs one relay pass.
    Submit(SubmitCommand),
    /// Prints the mirror's lag behind the live chain.
    Status(StatusCommand),
}

/// The Bitcoin mirror header relay.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub struct Cli {
    /// Global arguments for the CLI.
    #[command(flatten)]
    pub global: GlobalArgs,
    /// The subcommand to run.
    #[command(subcommand)]
    pub subcommand: Commands,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        init_tracing_subscriber(&self.global.log_args)?;

        let rt = Self::tokio_runtime()?;
        rt.block_on(async move {
            match self.subcommand {
                Commands::Submit(cmd) => cmd.run(&self.global).await.map(drop),
                Commands::Status(cmd) => cmd.run(&self.global).await,
            }
        })
    }

    /// Creates a new multi-thread tokio runtime with all features enabled.
    pub fn tokio_runtime() -> std::io::Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from([
            "btc-mirror-submitter",
            "status",
            "--contract",
            "0x69f2a3e2bc4f7ad5ab8b0b0d4c2d7e6d2b3f0a11",
            "--eth-rpc-url",
            "http://localhost:8545",
            "--bitcoin-api-key",
            "key",
        ])
        .unwrap();

        assert!(matches!(cli.subcommand, Commands::Status(_)));
        assert!(cli.global.mirror.endpoint().is_ok());
        assert!(cli.global.bitcoin.config().is_ok());
    }

    #[test]
    fn test_parse_submit_with_overrides() {
        let cli = Cli::try_parse_from([
            "btc-mirror-submitter",
            "-v",
            "submit",
            "--max-blocks-per-batch",
            "50",
            "--min-new-blocks",
            "3",
            "--destination-chain-id",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.global.log_args.verbosity, 1);
        assert_eq!(cli.global.mirror.destination_chain_id.map(|c| c.id()), Some(10));
        let Commands::Submit(cmd) = cli.subcommand else { panic!("expected submit") };
        assert_eq!(cmd.relay.max_blocks_per_batch, 50);
        assert_eq!(cmd.relay.min_new_blocks, Some(3));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["btc-mirror-submitter"]).is_err());
    }
}
