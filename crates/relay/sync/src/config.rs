//! Relay configuration.

use crate::SyncConfigError;
use std::time::Duration;

/// Gas limit schedule for submissions: a fixed overhead plus a marginal cost per header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSchedule {
    /// Fixed overhead per submission.
    pub base: u64,
    /// Marginal cost per header.
    pub per_header: u64,
}

impl GasSchedule {
    /// Returns the gas limit for a submission carrying `headers` headers.
    pub const fn limit_for(&self, headers: usize) -> u64 {
        self.base.saturating_add(self.per_header.saturating_mul(headers as u64))
    }
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self { base: 100_000, per_header: 30_000 }
    }
}

/// Tunables for a [`Synchronizer`](crate::Synchronizer) pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum number of headers in one submission.
    pub max_batch_size: u64,
    /// How far below the mirror tip the fork point may lie before the run refuses to continue.
    pub max_reorg_depth: u64,
    /// Runs with fewer new blocks than this submit nothing.
    pub min_new_blocks: Option<u64>,
    /// Interval between receipt polls.
    pub poll_interval: Duration,
    /// How long to wait for a receipt before giving up.
    pub confirmation_timeout: Duration,
    /// Gas limit schedule.
    pub gas: GasSchedule,
}

impl SyncConfig {
    /// The default batch size cap.
    pub const DEFAULT_MAX_BATCH_SIZE: u64 = 200;
    /// The default bound on the backward fork search.
    pub const DEFAULT_MAX_REORG_DEPTH: u64 = 20;

    /// Checks the config before any network I/O.
    pub const fn validate(&self) -> Result<(), SyncConfigError> {
        if self.max_batch_size == 0 {
            return Err(SyncConfigError::ZeroBatchSize);
        }
        if self.poll_interval.is_zero() {
            return Err(SyncConfigError::ZeroPollInterval);
        }
        if matches!(self.min_new_blocks, Some(0)) {
            return Err(SyncConfigError::ZeroThreshold);
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Self::DEFAULT_MAX_BATCH_SIZE,
            max_reorg_depth: Self::DEFAULT_MAX_REORG_DEPTH,
            min_new_blocks: None,
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(600),
            gas: GasSchedule::default(),
        }
    }
}
