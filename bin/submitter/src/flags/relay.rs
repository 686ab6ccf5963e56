//! Relay tuning flags.

use btc_mirror_contract::DestinationProfile;
use btc_mirror_sync::{SyncConfig, SyncConfigError};
use clap::Parser;
use std::time::Duration;

/// Relay tunables. Unset values fall back to the destination's defaults.
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
pub struct RelayArgs {
    /// Maximum headers per submission.
    #[arg(long, env = "MAX_BLOCKS_PER_BATCH", default_value_t = SyncConfig::DEFAULT_MAX_BATCH_SIZE)]
    pub max_blocks_per_batch: u64,
    /// How far below the mirror tip a fork may reach before the run is refused.
    #[arg(long, env = "MAX_REORG_DEPTH", default_value_t = SyncConfig::DEFAULT_MAX_REORG_DEPTH)]
    pub max_reorg_depth: u64,
    /// Skip runs with fewer new blocks than this.
    #[arg(long, env = "MIN_NEW_BLOCKS")]
    pub min_new_blocks: Option<u64>,
    /// L1 base fee ceiling in gwei, for OP Stack destinations.
    #[arg(long, env = "MAX_L1_BASE_FEE_GWEI")]
    pub max_l1_base_fee_gwei: Option<u64>,
    /// Seconds between receipt polls.
    #[arg(long, default_value_t = 1)]
    pub poll_interval_secs: u64,
    /// Seconds to wait for a receipt before failing the run.
    #[arg(long, default_value_t = 600)]
    pub confirmation_timeout_secs: u64,
}

impl Default for RelayArgs {
    fn default() -> Self {
        Self {
            max_blocks_per_batch: SyncConfig::DEFAULT_MAX_BATCH_SIZE,
            max_reorg_depth: SyncConfig::DEFAULT_MAX_REORG_DEPTH,
            min_new_blocks: None,
            max_l1_base_fee_gwei: None,
            poll_interval_secs: 1,
            confirmation_timeout_secs: 600,
        }
    }
}

impl RelayArgs {
    /// Builds the relay config, taking unset values from `profile`.
    pub fn sync_config(
        &self,
        profile: Option<&DestinationProfile>,
    ) -> Result<SyncConfig, SyncConfigError> {
        let config = SyncConfig {
            max_batch_size: self.max_blocks_per_batch,
            max_reorg_depth: self.max_reorg_depth,
            min_new_blocks: self.min_new_blocks.or(profile.and_then(|p| p.min_new_blocks)),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            confirmation_timeout: Duration::from_secs(self.confirmation_timeout_secs),
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the fee ceiling to enforce, if the destination is fee-gated.
    pub fn fee_ceiling_gwei(&self, profile: &DestinationProfile) -> Option<u64> {
        profile.fee_ceiling_gwei.map(|default| self.max_l1_base_fee_gwei.unwrap_or(default))
    }
}
