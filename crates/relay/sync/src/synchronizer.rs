//! The header relay synchronizer.

use crate::{HashCache, SubmissionBatch, SyncConfig, SyncError, find_common_height};
use alloy_primitives::TxHash;
use btc_mirror_bitcoin::{BlockHash, BlockHeader, Height, SourceChainProvider};
use btc_mirror_contract::{FeeDecision, FeeGuard, MirrorProvider, ReceiptStatus};
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// How a pass ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The mirror already holds the live tip.
    UpToDate {
        /// The mirror's latest height.
        mirror_height: Height,
        /// The live chain tip.
        chain_tip: Height,
    },
    /// Too few new blocks to be worth a submission.
    BelowThreshold {
        /// The mirror's latest height.
        mirror_height: Height,
        /// The live chain tip.
        chain_tip: Height,
        /// The configured minimum.
        threshold: u64,
    },
    /// The fee guard skipped the run.
    FeeTooHigh {
        /// The observed fee, in gwei.
        observed: u64,
        /// The configured ceiling, in gwei.
        ceiling: u64,
    },
    /// A batch was submitted and confirmed.
    Submitted {
        /// The first submitted height.
        from_height: Height,
        /// The last submitted height.
        to_height: Height,
        /// The confirmed transaction.
        tx_hash: TxHash,
    },
}

/// A read-only snapshot of how far the mirror trails the live chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorStatus {
    /// The mirror's latest height.
    pub mirror_height: Height,
    /// The live chain tip.
    pub chain_tip: Height,
    /// Blocks the mirror is behind. Zero when it is level or ahead.
    pub lag: u64,
}

/// Brings the mirror up to the live chain, one pass per [`Synchronizer::run`].
///
/// No state survives between passes: every run re-reads both sides and recomputes the fork point.
#[derive(Debug)]
pub struct Synchronizer<S, M> {
    source: Arc<S>,
    mirror: M,
    fee_guard: FeeGuard,
    config: SyncConfig,
}

impl<S, M> Synchronizer<S, M>
where
    S: SourceChainProvider + 'static,
    M: MirrorProvider,
{
    /// Creates a new synchronizer.
    pub fn new(source: S, mirror: M, fee_guard: FeeGuard, config: SyncConfig) -> Self {
        Self { source: Arc::new(source), mirror, fee_guard, config }
    }

    /// Returns the source chain provider.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the mirror provider.
    pub const fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Returns the config.
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Reads both heights without submitting anything.
    pub async fn status(&self) -> Result<MirrorStatus, SyncError> {
        let (mirror_height, chain_tip) = self.read_heights().await?;
        Ok(MirrorStatus { mirror_height, chain_tip, lag: chain_tip.saturating_sub(mirror_height) })
    }

    /// Runs one pass.
    pub async fn run(&self) -> Result<SyncOutcome, SyncError> {
        let (mirror_height, chain_tip) = self.read_heights().await?;
        info!(target: "synchronizer", mirror_height, chain_tip, "Read heights");

        if chain_tip <= mirror_height {
            info!(target: "synchronizer", mirror_height, chain_tip, "Mirror is up to date");
            return Ok(SyncOutcome::UpToDate { mirror_height, chain_tip });
        }

        let new_blocks = chain_tip - mirror_height;
        if let Some(threshold) = self.config.min_new_blocks.filter(|t| new_blocks < *t) {
            info!(
                target: "synchronizer",
                new_blocks,
                threshold,
                "Too few new blocks, skipping submission"
            );
            return Ok(SyncOutcome::BelowThreshold { mirror_height, chain_tip, threshold });
        }

        if let FeeDecision::Skip { observed, ceiling } = self.fee_guard.check().await? {
            return Ok(SyncOutcome::FeeTooHigh { observed, ceiling });
        }

        let target_height = chain_tip.min(mirror_height.saturating_add(self.config.max_batch_size));
        let mut cache = HashCache::new(Arc::clone(&self.source));
        let reconciliation = find_common_height(
            &mut cache,
            &self.mirror,
            mirror_height,
            target_height,
            self.config.max_reorg_depth,
        )
        .await?;
        drop(cache);

        let headers = self.fetch_headers(&reconciliation.hashes).await?;
        let batch = SubmissionBatch::assemble(&reconciliation, headers)?;
        let gas_limit = batch.gas_limit(&self.config.gas);
        info!(
            target: "synchronizer",
            from_height = batch.from_height(),
            to_height = batch.to_height(),
            headers = batch.header_count(),
            gas_limit,
            "Submitting batch"
        );

        let handle = self.mirror.submit(batch.from_height(), batch.payload(), gas_limit).await?;
        self.confirm(handle.tx_hash).await?;

        Ok(SyncOutcome::Submitted {
            from_height: batch.from_height(),
            to_height: batch.to_height(),
            tx_hash: handle.tx_hash,
        })
    }

    async fn read_heights(&self) -> Result<(Height, Height), SyncError> {
        futures::try_join!(
            async { self.mirror.latest_height().await.map_err(SyncError::from) },
            async { self.source.tip_height().await.map_err(SyncError::from) },
        )
    }

    async fn fetch_headers(&self, hashes: &[BlockHash]) -> Result<Vec<BlockHeader>, SyncError> {
        let fetches = hashes.iter().map(|hash| self.source.header_at(*hash));
        Ok(try_join_all(fetches).await?)
    }

    /// Polls for the receipt of `tx_hash` until it appears or the confirmation timeout elapses.
    ///
    /// The first poll happens one interval after submission.
    async fn confirm(&self, tx_hash: TxHash) -> Result<(), SyncError> {
        let started = Instant::now();
        let period = self.config.poll_interval;
        let mut ticker = tokio::time::interval_at(started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.mirror.receipt_status(tx_hash).await? {
                Some(ReceiptStatus::Succeeded) => {
                    info!(target: "synchronizer", %tx_hash, "Transaction succeeded");
                    return Ok(());
                }
                Some(ReceiptStatus::Failed) => {
                    error!(target: "synchronizer", %tx_hash, "Transaction failed");
                    return Err(SyncError::TransactionFailed { tx_hash });
                }
                None => {
                    let waited = started.elapsed();
                    if waited >= self.config.confirmation_timeout {
                        error!(
                            target: "synchronizer",
                            %tx_hash,
                            ?waited,
                            "Gave up waiting for receipt"
                        );
                        return Err(SyncError::Unconfirmed { tx_hash, waited });
                    }
                    debug!(target: "synchronizer", %tx_hash, ?waited, "Transaction pending");
                }
            }
        }
    }
}
