//! Submission batches.

use crate::{GasSchedule, ReconciliationResult, SyncError};
use alloy_primitives::Bytes;
use btc_mirror_bitcoin::{BlockHeader, HEADER_SIZE, Height};

/// A contiguous, height-ordered run of headers sent in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionBatch {
    from_height: Height,
    headers: Vec<BlockHeader>,
}

impl SubmissionBatch {
    /// Builds the batch for `reconciliation` from headers fetched in height order.
    ///
    /// Rejects a header count that does not cover the range exactly, any header that does not
    /// commit to the hash resolved for the height below it, and any header that does not hash to
    /// the block resolved for its own height.
    pub fn assemble(
        reconciliation: &ReconciliationResult,
        headers: Vec<BlockHeader>,
    ) -> Result<Self, SyncError> {
        let expected = reconciliation.target_height() - reconciliation.common_height;
        let actual = headers.len() as u64;
        if actual != expected {
            return Err(SyncError::ShortHeaderSet { expected, actual });
        }

        let mut parent = reconciliation.common_hash;
        for (offset, (header, hash)) in headers.iter().zip(&reconciliation.hashes).enumerate() {
            let height = reconciliation.from_height() + offset as Height;
            if header.prev_block_hash() != parent {
                return Err(SyncError::MisalignedHeader { height });
            }
            if header.block_hash() != *hash {
                return Err(SyncError::HeaderHashMismatch { height });
            }
            parent = *hash;
        }

        Ok(Self { from_height: reconciliation.from_height(), headers })
    }

    /// The first height carried.
    pub const fn from_height(&self) -> Height {
        self.from_height
    }

    /// The last height carried.
    pub const fn to_height(&self) -> Height {
        self.from_height + self.headers.len() as Height - 1
    }

    /// The number of headers.
    pub const fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// The headers concatenated with no separators.
    pub fn payload(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.headers.len() * HEADER_SIZE);
        for header in &self.headers {
            out.extend_from_slice(header.as_bytes());
        }
        out.into()
    }

    /// The gas limit for submitting this batch.
    pub const fn gas_limit(&self, schedule: &GasSchedule) -> u64 {
        schedule.limit_for(self.headers.len())
    }
}
