//! Per-snapshot memoization of semantic models

use super::{SemanticModel, SemanticModelProvider};
use crate::error::RefitError;
use crate::result::Result;
use crate::syntax::{SnapshotId, SyntaxTree};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

type Slot = Arc<OnceCell<Arc<dyn SemanticModel>>>;

/// Computes each snapshot's model at most once
///
/// Concurrent requests for the same snapshot wait on a single computation.
/// A failed or cancelled computation leaves the slot empty so the next
/// request retries. Snapshots are immutable, so entries never go stale;
/// callers [`evict`](Self::evict) snapshots they no longer need.
pub struct SemanticCache {
    provider: Arc<dyn SemanticModelProvider>,
    slots: DashMap<SnapshotId, Slot>,
}

impl SemanticCache {
    pub fn new(provider: Arc<dyn SemanticModelProvider>) -> Self {
        Self {
            provider,
            slots: DashMap::new(),
        }
    }

    pub async fn get(
        &self,
        tree: &SyntaxTree,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn SemanticModel>> {
        if cancel.is_cancelled() {
            return Err(RefitError::Cancelled);
        }
        // clone the slot out so the map shard is not held across the await
        let slot = self.slots.entry(tree.snapshot()).or_default().clone();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RefitError::Cancelled),
            model = slot.get_or_try_init(|| async {
                tracing::debug!(snapshot = %tree.snapshot(), "Computing semantic model");
                self.provider.semantic_model(tree, cancel).await
            }) => model.cloned(),
        }
    }

    pub fn evict(&self, snapshot: SnapshotId) {
        self.slots.remove(&snapshot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for SemanticCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticCache")
            .field("snapshots", &self.slots.len())
            .finish()
    }
}
