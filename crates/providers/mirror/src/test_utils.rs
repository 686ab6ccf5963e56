//! In-memory stand-ins for the mirror contract and the fee oracle.

use crate::{
    FeeGuardError, FeeOracle, MirrorProvider, MirrorResult, ReceiptStatus, TransactionHandle,
};
use alloy_primitives::{B256, Bytes, TxHash, keccak256};
use async_trait::async_trait;
use btc_mirror_bitcoin::{
    BlockHash, BlockHeader, HEADER_SIZE, Height,
    test_utils::{InMemoryBitcoinNode, header_hash},
};
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

/// A submission recorded by [`InMemoryMirror`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The first height carried.
    pub from_height: Height,
    /// The submitted headers, in order.
    pub headers: Vec<BlockHeader>,
    /// The raw calldata payload.
    pub payload: Bytes,
    /// The gas limit attached to the transaction.
    pub gas_limit: u64,
    /// The transaction hash handed back to the caller.
    pub tx_hash: TxHash,
}

#[derive(Debug)]
struct PendingReceipt {
    polls_left: u32,
    status: ReceiptStatus,
}

#[derive(Debug, Default)]
struct MirrorState {
    hashes: BTreeMap<Height, BlockHash>,
    latest: Height,
    submissions: Vec<Submission>,
    receipts: HashMap<TxHash, PendingReceipt>,
    pending_polls: u32,
    revert_all: bool,
    height_reads: usize,
    hash_reads: Vec<Height>,
    receipt_polls: usize,
}

impl MirrorState {
    /// Mimics the contract's acceptance rule: the headers must link to the recorded hash below
    /// `from_height`, link to each other, and leave the mirror strictly taller.
    fn accepts(&self, from_height: Height, headers: &[BlockHeader]) -> bool {
        if self.revert_all || headers.is_empty() || from_height == 0 {
            return false;
        }
        if from_height > self.latest + 1 {
            return false;
        }
        let Some(mut prev) = self.hashes.get(&(from_height - 1)).copied() else {
            return false;
        };
        for header in headers {
            if header.prev_block_hash() != prev {
                return false;
            }
            prev = header_hash(header);
        }
        from_height + headers.len() as Height - 1 > self.latest
    }
}

/// An in-memory [`MirrorProvider`] with contract-like acceptance rules.
///
/// Hashes submitted headers with [`header_hash`], matching
/// [`InMemoryBitcoinNode`]. Receipts become visible after a configurable number of polls.
#[derive(Debug, Default)]
pub struct InMemoryMirror {
    state: Mutex<MirrorState>,
}

impl InMemoryMirror {
    /// Creates a mirror from `(height, hash)` pairs. The latest height is the largest key.
    pub fn new(hashes: impl IntoIterator<Item = (Height, BlockHash)>) -> Self {
        let hashes: BTreeMap<_, _> = hashes.into_iter().collect();
        let latest = hashes.keys().next_back().copied().unwrap_or_default();
        Self { state: Mutex::new(MirrorState { hashes, latest, ..Default::default() }) }
    }

    /// Creates a mirror holding `node`'s canonical hashes for `0..=latest`.
    pub fn from_node(node: &InMemoryBitcoinNode, latest: Height) -> Self {
        Self::new((0..=latest).map(|height| (height, node.hash(height))))
    }

    /// Overwrites the recorded hash at `height`, raising the latest height if needed.
    pub fn set_hash(&self, height: Height, hash: BlockHash) {
        let mut state = self.state.lock();
        state.hashes.insert(height, hash);
        state.latest = state.latest.max(height);
    }

    /// Makes every submission revert.
    pub fn set_revert_all(&self, revert: bool) {
        self.state.lock().revert_all = revert;
    }

    /// Receipts of subsequent submissions stay pending for `polls` polls.
    pub fn set_pending_polls(&self, polls: u32) {
        self.state.lock().pending_polls = polls;
    }

    /// Returns the latest accepted height.
    pub fn latest(&self) -> Height {
        self.state.lock().latest
    }

    /// Returns the hash recorded at `height`.
    pub fn recorded_hash(&self, height: Height) -> Option<BlockHash> {
        self.state.lock().hashes.get(&height).copied()
    }

    /// Returns every submission received so far.
    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().submissions.clone()
    }

    /// Returns how many times the latest height was read.
    pub fn height_reads(&self) -> usize {
        self.state.lock().height_reads
    }

    /// Returns every height whose hash was read, in order.
    pub fn hash_reads(&self) -> Vec<Height> {
        self.state.lock().hash_reads.clone()
    }

    /// Returns how many times a receipt was polled.
    pub fn receipt_polls(&self) -> usize {
        self.state.lock().receipt_polls
    }
}

#[async_trait]
impl MirrorProvider for InMemoryMirror {
    async fn latest_height(&self) -> MirrorResult<Height> {
        let mut state = self.state.lock();
        state.height_reads += 1;
        Ok(state.latest)
    }

    async fn hash_at(&self, height: Height) -> MirrorResult<BlockHash> {
        let mut state = self.state.lock();
        state.hash_reads.push(height);
        Ok(state.hashes.get(&height).copied().unwrap_or(B256::ZERO))
    }

    async fn submit(
        &self,
        from_height: Height,
        headers: Bytes,
        gas_limit: u64,
    ) -> MirrorResult<TransactionHandle> {
        let mut state = self.state.lock();

        let parsed: Vec<BlockHeader> = headers
            .chunks_exact(HEADER_SIZE)
            .filter_map(|chunk| <[u8; HEADER_SIZE]>::try_from(chunk).ok())
            .map(BlockHeader::new)
            .collect();
        let well_formed = headers.len() % HEADER_SIZE == 0;

        let mut preimage = from_height.to_be_bytes().to_vec();
        preimage.extend_from_slice(&headers);
        preimage.extend_from_slice(&(state.submissions.len() as u64).to_be_bytes());
        let tx_hash = keccak256(preimage);

        let status = if well_formed && state.accepts(from_height, &parsed) {
            state.hashes.retain(|height, _| *height < from_height);
            for (offset, header) in parsed.iter().enumerate() {
                state.hashes.insert(from_height + offset as Height, header_hash(header));
            }
            state.latest = from_height + parsed.len() as Height - 1;
            ReceiptStatus::Succeeded
        } else {
            ReceiptStatus::Failed
        };

        let polls_left = state.pending_polls;
        state.receipts.insert(tx_hash, PendingReceipt { polls_left, status });
        state.submissions.push(Submission {
            from_height,
            headers: parsed,
            payload: headers,
            gas_limit,
            tx_hash,
        });

        Ok(TransactionHandle { tx_hash })
    }

    async fn receipt_status(&self, tx_hash: TxHash) -> MirrorResult<Option<ReceiptStatus>> {
        let mut state = self.state.lock();
        state.receipt_polls += 1;
        let Some(receipt) = state.receipts.get_mut(&tx_hash) else {
            return Ok(None);
        };
        if receipt.polls_left > 0 {
            receipt.polls_left -= 1;
            return Ok(None);
        }
        Ok(Some(receipt.status))
    }
}

/// A [`FeeOracle`] returning a settable fee.
#[derive(Debug, Default)]
pub struct FixedFeeOracle {
    fee_gwei: AtomicU64,
    calls: AtomicUsize,
}

impl FixedFeeOracle {
    /// Creates an oracle reporting `fee_gwei`.
    pub const fn new(fee_gwei: u64) -> Self {
        Self { fee_gwei: AtomicU64::new(fee_gwei), calls: AtomicUsize::new(0) }
    }

    /// Changes the reported fee.
    pub fn set(&self, fee_gwei: u64) {
        self.fee_gwei.store(fee_gwei, Ordering::SeqCst);
    }

    /// Returns how many times the oracle was read.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeeOracle for FixedFeeOracle {
    async fn current_fee_estimate(&self) -> Result<u64, FeeGuardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fee_gwei.load(Ordering::SeqCst))
    }
}
