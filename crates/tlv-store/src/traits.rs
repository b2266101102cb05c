use tlv_types::{AccountId, Amount, VaultRecord};

use crate::error::{StoreError, StoreResult};

/// Account-keyed vault record store.
///
/// All implementations must satisfy these invariants:
/// - `get` returns `Ok(None)` for an account that was never written.
/// - `put` replaces the whole record for one account and touches no other key.
/// - Records are never removed.
/// - All errors are propagated, never silently ignored.
pub trait VaultStore: Send + Sync {
    /// Read the record stored for `account`, if any.
    fn get(&self, account: &AccountId) -> StoreResult<Option<VaultRecord>>;

    /// Write `record` under `account`, replacing any previous record.
    fn put(&self, account: &AccountId, record: VaultRecord) -> StoreResult<()>;

    /// All accounts with a stored record, sorted.
    fn accounts(&self) -> StoreResult<Vec<AccountId>>;

    /// All `(account, record)` pairs, sorted by account.
    ///
    /// Default implementation calls `get()` for each account.
    fn entries(&self) -> StoreResult<Vec<(AccountId, VaultRecord)>> {
        let mut out = Vec::new();
        for account in self.accounts()? {
            if let Some(record) = self.get(&account)? {
                out.push((account, record));
            }
        }
        Ok(out)
    }

    /// Sum of every stored balance.
    fn total_balance(&self) -> StoreResult<Amount> {
        self.entries()?
            .iter()
            .try_fold(0 as Amount, |acc, (_, record)| acc.checked_add(record.balance))
            .ok_or(StoreError::BalanceOverflow)
    }
}
