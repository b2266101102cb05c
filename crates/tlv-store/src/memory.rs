use std::collections::HashMap;
use std::sync::RwLock;

use tlv_types::{AccountId, VaultRecord};
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::traits::VaultStore;

/// In-memory, HashMap-based vault store.
///
/// Intended for tests and embedding. Records are held behind a `RwLock` and
/// copied on read/write.
pub struct InMemoryVaultStore {
    records: RwLock<HashMap<AccountId, VaultRecord>>,
}

impl InMemoryVaultStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with `entries`.
    pub fn from_entries(entries: impl IntoIterator<Item = (AccountId, VaultRecord)>) -> Self {
        Self {
            records: RwLock::new(entries.into_iter().collect()),
        }
    }
}

impl Default for InMemoryVaultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultStore for InMemoryVaultStore {
    fn get(&self, account: &AccountId) -> StoreResult<Option<VaultRecord>> {
        let map = self
            .records
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(map.get(account).copied())
    }

    fn put(&self, account: &AccountId, record: VaultRecord) -> StoreResult<()> {
        let mut map = self
            .records
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        trace!(%account, balance = record.balance, unlock_height = record.unlock_height, "record written");
        map.insert(*account, record);
        Ok(())
    }

    fn accounts(&self) -> StoreResult<Vec<AccountId>> {
        let map = self
            .records
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let mut ids: Vec<AccountId> = map.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn entries(&self) -> StoreResult<Vec<(AccountId, VaultRecord)>> {
        let map = self
            .records
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let mut entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }
}

impl std::fmt::Debug for InMemoryVaultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.records.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("InMemoryVaultStore")
            .field("record_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(label: &str) -> AccountId {
        AccountId::from_label(label)
    }

    #[test]
    fn missing_account_reads_none() {
        let store = InMemoryVaultStore::new();
        assert_eq!(store.get(&account("alice")).unwrap(), None);
        assert!(store.accounts().unwrap().is_empty());
    }

    #[test]
    fn put_then_get() {
        let store = InMemoryVaultStore::new();
        let alice = account("alice");
        store.put(&alice, VaultRecord::new(1000, 110)).unwrap();
        assert_eq!(store.get(&alice).unwrap(), Some(VaultRecord::new(1000, 110)));
    }

    #[test]
    fn put_replaces_whole_record() {
        let store = InMemoryVaultStore::new();
        let alice = account("alice");
        store.put(&alice, VaultRecord::new(1000, 110)).unwrap();
        store.put(&alice, VaultRecord::EMPTY).unwrap();
        assert_eq!(store.get(&alice).unwrap(), Some(VaultRecord::EMPTY));
        // Drained accounts keep their key.
        assert_eq!(store.accounts().unwrap(), vec![alice]);
    }

    #[test]
    fn put_touches_only_its_key() {
        let store = InMemoryVaultStore::new();
        let alice = account("alice");
        let bob = account("bob");
        store.put(&alice, VaultRecord::new(5, 10)).unwrap();
        store.put(&bob, VaultRecord::new(7, 20)).unwrap();
        store.put(&alice, VaultRecord::EMPTY).unwrap();
        assert_eq!(store.get(&bob).unwrap(), Some(VaultRecord::new(7, 20)));
    }

    #[test]
    fn accounts_are_sorted() {
        let store = InMemoryVaultStore::new();
        for label in ["carol", "alice", "bob"] {
            store.put(&account(label), VaultRecord::new(1, 1)).unwrap();
        }
        let ids = store.accounts().unwrap();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn total_balance_sums_records() {
        let store = InMemoryVaultStore::from_entries([
            (account("alice"), VaultRecord::new(1000, 110)),
            (account("bob"), VaultRecord::new(500, 120)),
            (account("carol"), VaultRecord::EMPTY),
        ]);
        assert_eq!(store.total_balance().unwrap(), 1500);
    }

    #[test]
    fn total_balance_reports_overflow() {
        let store = InMemoryVaultStore::from_entries([
            (account("alice"), VaultRecord::new(u64::MAX, 1)),
            (account("bob"), VaultRecord::new(1, 1)),
        ]);
        assert_eq!(store.total_balance().unwrap_err(), StoreError::BalanceOverflow);
    }
}
