//! Synchronizer errors.

use alloy_primitives::TxHash;
use btc_mirror_bitcoin::{Height, SourceError};
use btc_mirror_contract::{FeeGuardError, MirrorError};
use std::time::Duration;
use thiserror::Error;

/// An error that ends a synchronizer pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source chain could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The mirror contract could not be read or written.
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    /// The fee oracle could not be read.
    #[error(transparent)]
    FeeGuard(#[from] FeeGuardError),
    /// No common hash within the reorg bound.
    #[error("no common block within {max_depth} blocks below mirror height {mirror_height}")]
    DeepReorg {
        /// The mirror height the search started from.
        mirror_height: Height,
        /// The configured search bound.
        max_depth: u64,
    },
    /// Fewer headers than the batch range requires.
    #[error("expected {expected} headers, fetched {actual}")]
    ShortHeaderSet {
        /// Headers the range requires.
        expected: u64,
        /// Headers fetched.
        actual: u64,
    },
    /// A header does not commit to the hash resolved for the height below it.
    #[error("header at height {height} does not link to its parent")]
    MisalignedHeader {
        /// The height of the offending header.
        height: Height,
    },
    /// A header does not hash to the block resolved for its height.
    #[error("header at height {height} is not the resolved block")]
    HeaderHashMismatch {
        /// The height of the offending header.
        height: Height,
    },
    /// The submission was mined and reverted.
    #[error("transaction {tx_hash} failed")]
    TransactionFailed {
        /// The reverted transaction.
        tx_hash: TxHash,
    },
    /// No receipt appeared in time.
    #[error("transaction {tx_hash} unconfirmed after {waited:?}")]
    Unconfirmed {
        /// The pending transaction.
        tx_hash: TxHash,
        /// How long the relay waited.
        waited: Duration,
    },
    /// A prefetch task panicked or was cancelled.
    #[error("prefetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A [`SyncConfig`](crate::SyncConfig) that cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncConfigError {
    /// `max_batch_size` is zero.
    #[error("max batch size must be at least 1")]
    ZeroBatchSize,
    /// `poll_interval` is zero.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
    /// `min_new_blocks` is zero.
    #[error("minimum new blocks must be at least 1 when set")]
    ZeroThreshold,
}
