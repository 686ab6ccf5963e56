//! Per-destination relay defaults.

use alloy_chains::Chain;

/// Chain id of OP Mainnet.
pub const OPTIMISM_MAINNET: u64 = 10;
/// Chain id of OP Sepolia.
pub const OPTIMISM_SEPOLIA: u64 = 11_155_420;
/// Chain id of zkSync Era.
pub const ZKSYNC_ERA: u64 = 324;
/// Chain id of zkSync Era Sepolia.
pub const ZKSYNC_SEPOLIA: u64 = 300;

/// The default L1 base fee ceiling on fee-gated destinations, in gwei.
pub const DEFAULT_FEE_CEILING_GWEI: u64 = 50;

/// How the relay should behave on a given destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationProfile {
    /// The destination chain.
    pub chain: Chain,
    /// Runs with fewer new blocks than this are skipped.
    pub min_new_blocks: Option<u64>,
    /// The L1 base fee ceiling, if the destination settles to L1 through a `GasPriceOracle`.
    pub fee_ceiling_gwei: Option<u64>,
}

impl DestinationProfile {
    /// Returns the defaults for `chain`.
    ///
    /// OP Stack chains are fee-gated and batch at least 6 headers. zkSync chains batch at least
    /// 10. Everything else submits as soon as there is something new.
    pub fn for_chain(chain: Chain) -> Self {
        let (min_new_blocks, fee_ceiling_gwei) = match chain.id() {
            OPTIMISM_MAINNET | OPTIMISM_SEPOLIA => (Some(6), Some(DEFAULT_FEE_CEILING_GWEI)),
            ZKSYNC_ERA | ZKSYNC_SEPOLIA => (Some(10), None),
            _ => (None, None),
        };
        Self { chain, min_new_blocks, fee_ceiling_gwei }
    }

    /// Returns `true` if the destination reads a fee oracle before submitting.
    pub const fn is_fee_gated(&self) -> bool {
        self.fee_ceiling_gwei.is_some()
    }
}
