//! Startup configuration errors.

use btc_mirror_bitcoin::SourceError;
use btc_mirror_sync::SyncConfigError;
use thiserror::Error;

/// A configuration problem detected before any network I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The mirror contract address is not set.
    #[error("missing mirror contract address (BTCMIRROR_CONTRACT_ADDR)")]
    MissingContract,
    /// The destination RPC URL is not set.
    #[error("missing destination rpc url (ETH_RPC_URL)")]
    MissingEthRpcUrl,
    /// The submitter key is not set.
    #[error("missing submitter private key (ETH_SUBMITTER_PRIVATE_KEY)")]
    MissingPrivateKey,
    /// The submitter key does not parse.
    #[error("invalid submitter private key: {0}")]
    InvalidPrivateKey(String),
    /// The Bitcoin RPC settings are unusable.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The relay tunables are unusable.
    #[error(transparent)]
    Sync(#[from] SyncConfigError),
}
