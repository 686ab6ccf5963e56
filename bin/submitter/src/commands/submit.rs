//! Submit Subcommand

use crate::{
    error::ConfigError,
    flags::{GlobalArgs, RelayArgs},
};
use alloy_chains::Chain;
use alloy_signer_local::PrivateKeySigner;
use btc_mirror_bitcoin::BitcoinRpcClient;
use btc_mirror_contract::{
    AlloyMirrorClient, DestinationProfile, FeeGuard, L1BaseFeeOracle, MirrorClientConfig,
    signing_provider,
};
use btc_mirror_sync::{SyncOutcome, Synchronizer};
use clap::Parser;
use tracing::{info, warn};

/// The `submit` Subcommand
///
/// Runs one relay pass: reconciles the mirror with the live chain and submits the missing
/// headers in a single transaction, then waits for its receipt.
///
/// # Usage
///
/// ```sh
/// btc-mirror-submitter submit [FLAGS] [OPTIONS]
/// ```
#[derive(Parser, Debug, Clone)]
#[command(about = "Submits the headers the mirror is missing, then exits")]
pub struct SubmitCommand {
    /// Hex-encoded private key that signs submissions.
    #[arg(long, env = "ETH_SUBMITTER_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
    /// Relay tunables.
    #[command(flatten)]
    pub relay: RelayArgs,
}

impl SubmitCommand {
    /// Parses the submitter key.
    pub fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
        let raw = self
            .private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingPrivateKey)?;
        raw.parse::<PrivateKeySigner>().map_err(|e| ConfigError::InvalidPrivateKey(e.to_string()))
    }

    /// Runs the subcommand, returning how the pass ended.
    pub async fn run(self, args: &GlobalArgs) -> anyhow::Result<SyncOutcome> {
        // Everything that can be checked offline is checked before the first request.
        let bitcoin = args.bitcoin.config().map_err(ConfigError::from)?;
        let (rpc_url, contract) = args.mirror.endpoint()?;
        let signer = self.signer()?;
        self.relay.sync_config(None).map_err(ConfigError::from)?;

        let source = BitcoinRpcClient::new(&bitcoin)?;
        let provider = signing_provider(rpc_url, signer);
        let mirror = AlloyMirrorClient::new(provider.clone(), MirrorClientConfig { contract });

        let chain = match args.mirror.destination_chain_id {
            Some(chain) => chain,
            None => Chain::from_id(mirror.chain_id().await?),
        };
        let profile = DestinationProfile::for_chain(chain);
        let config = self.relay.sync_config(Some(&profile)).map_err(ConfigError::from)?;

        if self.relay.max_l1_base_fee_gwei.is_some() && !profile.is_fee_gated() {
            warn!(
                target: "submitter",
                %chain,
                "Destination has no L1 fee oracle, ignoring fee ceiling"
            );
        }
        let fee_guard = match self.relay.fee_ceiling_gwei(&profile) {
            Some(ceiling) => FeeGuard::new(L1BaseFeeOracle::new(provider), ceiling),
            None => FeeGuard::disabled(),
        };

        info!(
            target: "submitter",
            %chain,
            %contract,
            bitcoin_network = %args.bitcoin.network,
            max_batch_size = config.max_batch_size,
            min_new_blocks = ?config.min_new_blocks,
            fee_ceiling_gwei = ?fee_guard.ceiling_gwei(),
            "Starting relay pass"
        );

        let outcome = Synchronizer::new(source, mirror, fee_guard, config).run().await?;
        info!(target: "submitter", ?outcome, "Relay pass finished");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// A well-known development key.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn command(private_key: Option<&str>) -> SubmitCommand {
        SubmitCommand { private_key: private_key.map(String::from), relay: RelayArgs::default() }
    }

    #[test]
    fn test_signer() {
        let signer = command(Some(DEV_KEY)).signer().unwrap();
        assert_eq!(
            signer.address(),
            alloy_primitives::address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert!(command(Some(DEV_KEY.trim_start_matches("0x"))).signer().is_ok());
    }

    #[rstest]
    #[case::unset(None)]
    #[case::empty(Some(""))]
    #[case::blank(Some("   "))]
    fn test_missing_signer(#[case] key: Option<&str>) {
        assert!(matches!(command(key).signer(), Err(ConfigError::MissingPrivateKey)));
    }

    #[test]
    fn test_invalid_signer_does_not_echo_key() {
        let err = command(Some("0xnot-a-key")).signer().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrivateKey(_)));
        assert!(!err.to_string().contains("not-a-key"));
    }
}
