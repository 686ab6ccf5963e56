//! # btc-mirror-contract
//!
//! Access to the destination chain: the on-chain Bitcoin mirror and, on rollups settling to L1,
//! the fee oracle that gates submissions.
//!
//! - [`MirrorProvider`] reads the mirror's height and hashes and submits header batches.
//!   [`AlloyMirrorClient`] implements it over any alloy [`Provider`](alloy_provider::Provider).
//! - [`FeeGuard`] compares a [`FeeOracle`] estimate against a ceiling.
//! - [`DestinationProfile`] holds the per-chain relay defaults.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod bindings;
pub use bindings::GAS_PRICE_ORACLE_ADDRESS;

mod errors;
pub use errors::{FeeGuardError, MirrorError, MirrorResult};

mod client;
pub use client::{
    AlloyMirrorClient, MirrorClientConfig, MirrorProvider, ReceiptStatus, TransactionHandle,
    read_only_provider, signing_provider,
};

mod fee;
pub use fee::{FeeDecision, FeeGuard, FeeOracle, GWEI, L1BaseFeeOracle, wei_to_gwei};

mod profile;
pub use profile::{
    DEFAULT_FEE_CEILING_GWEI, DestinationProfile, OPTIMISM_MAINNET, OPTIMISM_SEPOLIA, ZKSYNC_ERA,
    ZKSYNC_SEPOLIA,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
