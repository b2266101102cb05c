use std::sync::atomic::{AtomicU64, Ordering};

use tlv_types::BlockHeight;

/// Source of the host ledger's current block height.
///
/// Implementations must never report a height lower than one already
/// reported.
pub trait HeightOracle: Send + Sync {
    fn current_height(&self) -> BlockHeight;
}

/// Manually driven block height for tests, the CLI, and embedding.
#[derive(Debug, Default)]
pub struct ManualHeight {
    height: AtomicU64,
}

impl ManualHeight {
    pub fn new(height: BlockHeight) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    /// Move forward by `blocks`, saturating at `u64::MAX`. Returns the new height.
    pub fn advance(&self, blocks: u64) -> BlockHeight {
        let previous = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(blocks))
            })
            .unwrap_or_else(|h| h);
        previous.saturating_add(blocks)
    }

    /// Move to `height` unless already past it. Returns the resulting height.
    pub fn advance_to(&self, height: BlockHeight) -> BlockHeight {
        let previous = self.height.fetch_max(height, Ordering::SeqCst);
        previous.max(height)
    }
}

impl HeightOracle for ManualHeight {
    fn current_height(&self) -> BlockHeight {
        self.height.load(Ordering::SeqCst)
    }
}
