use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tlv_types::{AccountId, VaultRecord};

/// Point-in-time copy of all ledger state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub counter: u64,
    pub records: BTreeMap<AccountId, VaultRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keys_are_account_hex() {
        let alice = AccountId::from_label("alice");
        let mut records = BTreeMap::new();
        records.insert(alice, VaultRecord::new(1000, 110));
        let snapshot = LedgerSnapshot {
            counter: 3,
            records,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["counter"], 3);
        assert_eq!(json["records"][alice.to_hex()]["balance"], 1000);
    }
}
