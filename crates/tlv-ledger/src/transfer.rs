use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tlv_types::{AccountId, Amount};
use tracing::debug;

/// Errors reported by a value-transfer backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("insufficient funds in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },

    #[error("account {0} is frozen")]
    Frozen(AccountId),

    #[error("sender and recipient are both {0}")]
    SelfTransfer(AccountId),

    #[error("credit to {0} overflows")]
    Overflow(AccountId),

    #[error("transfer backend unavailable: {0}")]
    Unavailable(String),
}

/// The host ledger's native value-transfer primitive.
///
/// A transfer is atomic: it either moves the full amount or fails and moves
/// nothing. Sender and recipient must differ.
pub trait ValueTransfer: Send + Sync {
    /// Move `amount` from `from` to `to`.
    fn transfer(&self, amount: Amount, from: &AccountId, to: &AccountId)
        -> Result<(), TransferError>;

    /// Spendable balance of `account` on the host ledger.
    fn balance_of(&self, account: &AccountId) -> Result<Amount, TransferError>;
}

/// Serializable bank state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub balances: BTreeMap<AccountId, Amount>,
    #[serde(default)]
    pub frozen: Vec<AccountId>,
}

/// In-memory host ledger balances for tests, the CLI, and embedding.
///
/// Frozen accounts can neither send nor receive, which makes the transfer
/// failure paths reachable in tests.
pub struct InMemoryBank {
    balances: RwLock<HashMap<AccountId, Amount>>,
    frozen: RwLock<HashSet<AccountId>>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            frozen: RwLock::new(HashSet::new()),
        }
    }

    pub fn from_snapshot(snapshot: BankSnapshot) -> Self {
        Self {
            balances: RwLock::new(snapshot.balances.into_iter().collect()),
            frozen: RwLock::new(snapshot.frozen.into_iter().collect()),
        }
    }

    pub fn snapshot(&self) -> Result<BankSnapshot, TransferError> {
        let balances = self.balances.read().map_err(poisoned)?;
        let frozen = self.frozen.read().map_err(poisoned)?;
        let mut frozen: Vec<AccountId> = frozen.iter().copied().collect();
        frozen.sort();
        Ok(BankSnapshot {
            balances: balances.iter().map(|(k, v)| (*k, *v)).collect(),
            frozen,
        })
    }

    /// Credit `amount` to `account` out of thin air. Returns the new balance.
    pub fn mint(&self, account: &AccountId, amount: Amount) -> Result<Amount, TransferError> {
        let mut balances = self.balances.write().map_err(poisoned)?;
        let balance = balances.entry(*account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*account))?;
        debug!(%account, amount, balance = *balance, "minted");
        Ok(*balance)
    }

    pub fn freeze(&self, account: &AccountId) -> Result<(), TransferError> {
        self.frozen.write().map_err(poisoned)?.insert(*account);
        Ok(())
    }

    pub fn unfreeze(&self, account: &AccountId) -> Result<(), TransferError> {
        self.frozen.write().map_err(poisoned)?.remove(account);
        Ok(())
    }
}

impl Default for InMemoryBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTransfer for InMemoryBank {
    fn transfer(
        &self,
        amount: Amount,
        from: &AccountId,
        to: &AccountId,
    ) -> Result<(), TransferError> {
        if from == to {
            return Err(TransferError::SelfTransfer(*from));
        }
        {
            let frozen = self.frozen.read().map_err(poisoned)?;
            for account in [from, to] {
                if frozen.contains(account) {
                    return Err(TransferError::Frozen(*account));
                }
            }
        }

        let mut balances = self.balances.write().map_err(poisoned)?;
        let from_balance = balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(TransferError::InsufficientFunds {
                account: *from,
                balance: from_balance,
                requested: amount,
            });
        }
        let to_balance = balances.get(to).copied().unwrap_or(0);
        let credited = to_balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*to))?;

        balances.insert(*from, from_balance - amount);
        balances.insert(*to, credited);
        debug!(%from, %to, amount, "transfer applied");
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> Result<Amount, TransferError> {
        let balances = self.balances.read().map_err(poisoned)?;
        Ok(balances.get(account).copied().unwrap_or(0))
    }
}

impl std::fmt::Debug for InMemoryBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accounts = self.balances.read().map(|b| b.len()).unwrap_or(0);
        f.debug_struct("InMemoryBank")
            .field("accounts", &accounts)
            .finish()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> TransferError {
    TransferError::Unavailable(format!("lock poisoned: {e}"))
}
