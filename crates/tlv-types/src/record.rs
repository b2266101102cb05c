use serde::{Deserialize, Serialize};

use crate::{Amount, BlockHeight};

/// Per-account custody record.
///
/// `unlock_height == 0` means "no active lock". An account that never
/// deposited, or one that has withdrawn, holds [`VaultRecord::EMPTY`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Amount currently held in custody for this account.
    pub balance: Amount,
    /// Height before which withdrawal is forbidden.
    pub unlock_height: BlockHeight,
}

impl VaultRecord {
    /// The sentinel zero record.
    pub const EMPTY: Self = Self {
        balance: 0,
        unlock_height: 0,
    };

    pub fn new(balance: Amount, unlock_height: BlockHeight) -> Self {
        Self {
            balance,
            unlock_height,
        }
    }

    /// Returns `true` for the sentinel zero record.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Returns `true` if a lock is recorded.
    pub fn is_locked(&self) -> bool {
        self.unlock_height != 0
    }

    /// Whether a withdrawal at `height` passes the time gate.
    ///
    /// The boundary is inclusive: withdrawal is allowed at exactly
    /// `unlock_height`.
    pub fn is_unlocked_at(&self, height: BlockHeight) -> bool {
        height >= self.unlock_height
    }

    /// Unlock height after a further deposit requesting `requested`.
    ///
    /// With no prior lock the requested height is taken as is. Otherwise the
    /// lock may only be held or extended.
    pub fn merged_unlock_height(&self, requested: BlockHeight) -> BlockHeight {
        if self.is_locked() {
            self.unlock_height.max(requested)
        } else {
            requested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_sentinel() {
        assert_eq!(VaultRecord::default(), VaultRecord::EMPTY);
        assert!(VaultRecord::EMPTY.is_empty());
        assert!(!VaultRecord::EMPTY.is_locked());
    }

    #[test]
    fn first_lock_takes_requested_height() {
        assert_eq!(VaultRecord::EMPTY.merged_unlock_height(5), 5);
    }

    #[test]
    fn lock_is_never_shortened() {
        let record = VaultRecord::new(1000, 120);
        assert_eq!(record.merged_unlock_height(110), 120);
        assert_eq!(record.merged_unlock_height(130), 130);
    }

    #[test]
    fn unlock_boundary_is_inclusive() {
        let record = VaultRecord::new(1, 10);
        assert!(!record.is_unlocked_at(9));
        assert!(record.is_unlocked_at(10));
        assert!(record.is_unlocked_at(11));
    }

    proptest! {
        #[test]
        fn merge_is_max_when_locked(u0 in 1u64.., u1 in any::<u64>()) {
            let record = VaultRecord::new(0, u0);
            prop_assert_eq!(record.merged_unlock_height(u1), u0.max(u1));
        }
    }
}
