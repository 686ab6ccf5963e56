//! Fork-point resolution between the mirror and the live chain.

use crate::{HashCache, SyncError};
use btc_mirror_bitcoin::{BlockHash, Height, SourceChainProvider};
use btc_mirror_contract::MirrorProvider;
use tracing::{debug, info};

/// The outcome of fork resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// The highest height where the mirror and the live chain agree.
    pub common_height: Height,
    /// The hash both sides hold at `common_height`.
    pub common_hash: BlockHash,
    /// Live-chain hashes for `common_height + 1 ..= target_height`, in height order.
    pub hashes: Vec<BlockHash>,
}

impl ReconciliationResult {
    /// The first height of the catch-up range.
    pub const fn from_height(&self) -> Height {
        self.common_height + 1
    }

    /// The last height of the catch-up range.
    pub const fn target_height(&self) -> Height {
        self.common_height + self.hashes.len() as Height
    }

    /// Returns the live-chain hash at `height`, if it lies in `common_height..=target_height`.
    pub fn hash_at(&self, height: Height) -> Option<BlockHash> {
        if height == self.common_height {
            return Some(self.common_hash);
        }
        let offset = height.checked_sub(self.from_height())?;
        self.hashes.get(usize::try_from(offset).ok()?).copied()
    }
}

/// Walks backward from `mirror_height` to the most recent height where both sides agree.
///
/// Compares at most `max_depth + 1` heights, never below zero. Source hashes for
/// `mirror_height + 1 ..= target_height` are prefetched up front, and each step prefetches the
/// next lower height before comparing the current one.
pub async fn find_common_height<S, M>(
    cache: &mut HashCache<S>,
    mirror: &M,
    mirror_height: Height,
    target_height: Height,
    max_depth: u64,
) -> Result<ReconciliationResult, SyncError>
where
    S: SourceChainProvider + 'static,
    M: MirrorProvider + ?Sized,
{
    if target_height > mirror_height {
        cache.prefetch_range(mirror_height + 1..=target_height);
    }

    let floor = mirror_height.saturating_sub(max_depth);
    let mut height = mirror_height;
    let common_hash = loop {
        if height > floor {
            cache.prefetch(height - 1);
        }

        let (source_hash, mirror_hash) = futures::try_join!(cache.get(height), async {
            mirror.hash_at(height).await.map_err(SyncError::from)
        })?;
        let matched = source_hash == mirror_hash;
        debug!(
            target: "synchronizer",
            height,
            %source_hash,
            %mirror_hash,
            matched,
            "Compared hashes"
        );

        if matched {
            break source_hash;
        }
        if height == floor {
            return Err(SyncError::DeepReorg { mirror_height, max_depth });
        }
        height -= 1;
    };

    let common_height = height;
    let mut hashes = Vec::with_capacity(target_height.saturating_sub(common_height) as usize);
    for h in common_height + 1..=target_height {
        hashes.push(cache.get(h).await?);
    }

    info!(
        target: "synchronizer",
        common_height,
        %common_hash,
        reorged = mirror_height - common_height,
        "Found common height"
    );
    Ok(ReconciliationResult { common_height, common_hash, hashes })
}
