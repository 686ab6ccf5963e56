//! Height-keyed source hash cache with background prefetching.

use crate::SyncError;
use btc_mirror_bitcoin::{BlockHash, Height, SourceChainProvider, SourceResult};
use std::{collections::HashMap, ops::RangeInclusive, sync::Arc};
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug)]
enum Slot {
    Pending(JoinHandle<SourceResult<BlockHash>>),
    Resolved(BlockHash),
}

/// Source-chain hashes keyed by height.
///
/// A slot is either a spawned fetch or a resolved hash. Prefetches complete in any order; reads
/// always go through the height key. Pending fetches are aborted on drop.
#[derive(Debug)]
pub struct HashCache<S> {
    source: Arc<S>,
    slots: HashMap<Height, Slot>,
}

impl<S> HashCache<S>
where
    S: SourceChainProvider + 'static,
{
    /// Creates an empty cache over `source`.
    pub fn new(source: Arc<S>) -> Self {
        Self { source, slots: HashMap::new() }
    }

    /// Starts fetching the hash at `height` unless it is already cached or in flight.
    pub fn prefetch(&mut self, height: Height) {
        if self.slots.contains_key(&height) {
            return;
        }
        trace!(target: "synchronizer", height, "Prefetching source hash");
        let source = Arc::clone(&self.source);
        let handle = tokio::spawn(async move { source.hash_at(height).await });
        self.slots.insert(height, Slot::Pending(handle));
    }

    /// Prefetches every height in `heights`.
    pub fn prefetch_range(&mut self, heights: RangeInclusive<Height>) {
        for height in heights {
            self.prefetch(height);
        }
    }

    /// Returns the hash at `height`, waiting on an in-flight fetch or fetching it now.
    pub async fn get(&mut self, height: Height) -> Result<BlockHash, SyncError> {
        let hash = match self.slots.remove(&height) {
            Some(Slot::Resolved(hash)) => hash,
            Some(Slot::Pending(handle)) => handle.await??,
            None => self.source.hash_at(height).await?,
        };
        self.slots.insert(height, Slot::Resolved(hash));
        Ok(hash)
    }
}

impl<S> Drop for HashCache<S> {
    fn drop(&mut self) {
        for slot in self.slots.values() {
            if let Slot::Pending(handle) = slot {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btc_mirror_bitcoin::{BitcoinRpcClient, test_utils::InMemoryBitcoinNode};

    fn cache(tip: Height) -> HashCache<BitcoinRpcClient<InMemoryBitcoinNode>> {
        let client = BitcoinRpcClient::with_transport(InMemoryBitcoinNode::with_tip(tip));
        HashCache::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_get_fetches_once() {
        let mut cache = cache(10);
        let expected = cache.source.transport().hash(5);

        assert_eq!(cache.get(5).await.unwrap(), expected);
        assert_eq!(cache.get(5).await.unwrap(), expected);
        assert_eq!(cache.source.transport().request_count("getblockhash"), 1);
    }

    #[tokio::test]
    async fn test_prefetch_resolves_out_of_order() {
        let mut cache = cache(10);
        cache.prefetch_range(3..=8);
        cache.prefetch(5);

        for height in [8, 3, 6, 4, 7, 5] {
            assert_eq!(cache.get(height).await.unwrap(), cache.source.transport().hash(height));
        }
        assert_eq!(cache.source.transport().request_count("getblockhash"), 6);
    }

    #[tokio::test]
    async fn test_prefetch_error_surfaces_on_get() {
        let mut cache = cache(10);
        cache.prefetch(42);

        let err = cache.get(42).await.unwrap_err();
        assert!(matches!(err, SyncError::Source(_)));
    }
}
