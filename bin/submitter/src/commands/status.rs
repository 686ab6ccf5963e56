//! Status Subcommand

use crate::{error::ConfigError, flags::GlobalArgs};
use btc_mirror_bitcoin::BitcoinRpcClient;
use btc_mirror_contract::{AlloyMirrorClient, FeeGuard, MirrorClientConfig, read_only_provider};
use btc_mirror_sync::{SyncConfig, Synchronizer};
use clap::Parser;

/// The `status` Subcommand
///
/// Prints the mirror height, the live chain tip and how far the mirror trails. Submits nothing
/// and needs no signing key.
///
/// # Usage
///
/// ```sh
/// btc-mirror-submitter status [FLAGS] [OPTIONS]
/// ```
#[derive(Parser, Debug, Clone)]
#[command(about = "Prints how far the mirror trails the live Bitcoin chain")]
pub struct StatusCommand {}

impl StatusCommand {
    /// Runs the subcommand.
    pub async fn run(self, args: &GlobalArgs) -> anyhow::Result<()> {
        let bitcoin = args.bitcoin.config().map_err(ConfigError::from)?;
        let (rpc_url, contract) = args.mirror.endpoint()?;

        let source = BitcoinRpcClient::new(&bitcoin)?;
        let mirror =
            AlloyMirrorClient::new(read_only_provider(rpc_url), MirrorClientConfig { contract });
        let sync = Synchronizer::new(source, mirror, FeeGuard::disabled(), SyncConfig::default());

        let status = sync.status().await?;
        println!("mirror height: {}", status.mirror_height);
        println!("chain tip:     {}", status.chain_tip);
        println!("lag:           {}", status.lag);
        Ok(())
    }
}
