use std::sync::{Mutex, MutexGuard};

use tlv_store::{InMemoryVaultStore, StoreError, VaultStore};
use tlv_types::{AccountId, Amount, BlockHeight, VaultRecord};
use tracing::{debug, error, warn};

use crate::config::LedgerConfig;
use crate::env::LedgerEnv;
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::sink::{EventSink, TracingSink};
use crate::snapshot::LedgerSnapshot;

/// The ledger state machine: a diagnostic counter plus timelocked custody.
///
/// Each state-changing call holds the ledger's lock for its whole duration,
/// reads the height oracle once, and either commits every write or none.
/// Deposit and withdraw only ever write the caller's own record.
pub struct VaultLedger<S: VaultStore = InMemoryVaultStore> {
    config: LedgerConfig,
    custody: AccountId,
    store: S,
    counter: Mutex<u64>,
    vault: Mutex<()>,
    env: LedgerEnv,
}

impl VaultLedger<InMemoryVaultStore> {
    /// A fresh ledger over an empty in-memory store.
    pub fn new(config: LedgerConfig, env: LedgerEnv) -> Self {
        Self::with_store(config, InMemoryVaultStore::new(), env)
    }

    /// Rebuild a ledger from a snapshot.
    pub fn restore(config: LedgerConfig, snapshot: LedgerSnapshot, env: LedgerEnv) -> Self {
        let store = InMemoryVaultStore::from_entries(snapshot.records);
        let mut ledger = Self::with_store(config, store, env);
        ledger.counter = Mutex::new(snapshot.counter);
        ledger
    }
}

impl<S: VaultStore> VaultLedger<S> {
    pub fn with_store(config: LedgerConfig, store: S, env: LedgerEnv) -> Self {
        let custody = config.custody_account();
        Self {
            config,
            custody,
            store,
            counter: Mutex::new(0),
            vault: Mutex::new(()),
            env,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The account holding all deposited funds.
    pub fn custody_account(&self) -> &AccountId {
        &self.custody
    }

    // ---- Counter ----

    pub fn increment(&self, caller: &AccountId) -> Result<u64, LedgerError> {
        let mut counter = self.lock_counter()?;
        let height = self.env.heights.current_height();
        let new_value = counter
            .checked_add(1)
            .ok_or(LedgerError::Overflow { what: "counter" })?;
        *counter = new_value;

        debug!(%caller, new_value, height, "counter incremented");
        self.emit(LedgerEvent::CounterIncremented {
            caller: *caller,
            new_value,
            height,
        });
        Ok(new_value)
    }

    pub fn decrement(&self, caller: &AccountId) -> Result<u64, LedgerError> {
        let mut counter = self.lock_counter()?;
        let height = self.env.heights.current_height();
        let new_value = counter.checked_sub(1).ok_or(LedgerError::Underflow)?;
        *counter = new_value;

        debug!(%caller, new_value, height, "counter decremented");
        self.emit(LedgerEvent::CounterDecremented {
            caller: *caller,
            new_value,
            height,
        });
        Ok(new_value)
    }

    // ---- Vault ----

    /// Lock `amount` in custody for `caller` until `unlock_height`.
    ///
    /// A later deposit can extend the caller's lock but never shorten it.
    /// Zero amounts are accepted and still apply the lock merge.
    pub fn deposit(
        &self,
        caller: &AccountId,
        amount: Amount,
        unlock_height: BlockHeight,
    ) -> Result<(), LedgerError> {
        let _invocation = self.lock_vault()?;
        let current = self.env.heights.current_height();
        if unlock_height <= current {
            return Err(LedgerError::InvalidUnlockHeight {
                requested: unlock_height,
                current,
            });
        }

        let existing = self.store.get(caller)?.unwrap_or_default();
        let new_balance = existing
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { what: "vault balance" })?;
        let effective_unlock = existing.merged_unlock_height(unlock_height);

        // Nothing is written until the funds have moved.
        self.env.transfers.transfer(amount, caller, &self.custody)?;

        let record = VaultRecord::new(new_balance, effective_unlock);
        if let Err(err) = self.store.put(caller, record) {
            self.refund(caller, amount);
            return Err(err.into());
        }

        debug!(
            %caller,
            amount,
            new_balance,
            unlock_height = effective_unlock,
            height = current,
            "deposit committed"
        );
        self.emit(LedgerEvent::Deposit {
            user: *caller,
            amount,
            new_balance,
            unlock_block: effective_unlock,
            current_block: current,
        });
        Ok(())
    }

    /// Release the caller's full balance once the unlock height is reached.
    ///
    /// The record is cleared before the outbound transfer. If the transfer
    /// fails the cleared record is written back before the error surfaces.
    pub fn withdraw(&self, caller: &AccountId) -> Result<Amount, LedgerError> {
        let _invocation = self.lock_vault()?;
        let current = self.env.heights.current_height();

        let record = match self.store.get(caller)? {
            Some(record) if record.balance > 0 => record,
            _ => return Err(LedgerError::NoFunds { account: *caller }),
        };
        if !record.is_unlocked_at(current) {
            return Err(LedgerError::TooEarly {
                unlock_height: record.unlock_height,
                current,
            });
        }

        self.store.put(caller, VaultRecord::EMPTY)?;

        if let Err(err) = self
            .env
            .transfers
            .transfer(record.balance, &self.custody, caller)
        {
            warn!(%caller, amount = record.balance, error = %err, "withdraw transfer failed; restoring record");
            if let Err(rollback) = self.store.put(caller, record) {
                error!(%caller, error = %rollback, "failed to restore record after transfer failure");
                return Err(rollback.into());
            }
            return Err(err.into());
        }

        debug!(
            %caller,
            amount = record.balance,
            unlock_height = record.unlock_height,
            height = current,
            "withdraw committed"
        );
        self.emit(LedgerEvent::Withdraw {
            user: *caller,
            amount: record.balance,
            unlock_block: record.unlock_height,
            current_block: current,
        });
        Ok(record.balance)
    }

    // ---- Queries ----

    pub fn get_counter(&self) -> Result<u64, LedgerError> {
        Ok(*self.lock_counter()?)
    }

    pub fn get_current_block(&self) -> BlockHeight {
        self.env.heights.current_height()
    }

    /// The account's record, or the zero record if it never deposited.
    pub fn get_vault_info(&self, account: &AccountId) -> Result<VaultRecord, LedgerError> {
        Ok(self.store.get(account)?.unwrap_or_default())
    }

    /// Every account that has a stored record, sorted.
    pub fn accounts(&self) -> Result<Vec<AccountId>, LedgerError> {
        Ok(self.store.accounts()?)
    }

    /// Sum of all recorded balances.
    pub fn custody_balance(&self) -> Result<Amount, LedgerError> {
        Ok(self.store.total_balance()?)
    }

    /// Check that the custody account holds exactly the recorded balances.
    pub fn verify_custody(&self) -> Result<Amount, LedgerError> {
        let _invocation = self.lock_vault()?;
        let recorded = self.store.total_balance()?;
        let held = self.env.transfers.balance_of(&self.custody)?;
        if held != recorded {
            return Err(LedgerError::CustodyMismatch { held, recorded });
        }
        Ok(held)
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let counter = *self.lock_counter()?;
        let _invocation = self.lock_vault()?;
        Ok(LedgerSnapshot {
            counter,
            records: self.store.entries()?.into_iter().collect(),
        })
    }

    // ---- Internals ----

    fn emit(&self, event: LedgerEvent) {
        if self.config.trace_events {
            TracingSink.emit(&event);
        }
        self.env.events.emit(&event);
    }

    /// Return a deposit whose record could not be written.
    fn refund(&self, caller: &AccountId, amount: Amount) {
        if let Err(err) = self.env.transfers.transfer(amount, &self.custody, caller) {
            error!(%caller, amount, error = %err, "refund after failed deposit write did not complete");
        }
    }

    fn lock_counter(&self) -> Result<MutexGuard<'_, u64>, LedgerError> {
        self.counter
            .lock()
            .map_err(|e| StoreError::LockPoisoned(format!("counter: {e}")).into())
    }

    fn lock_vault(&self) -> Result<MutexGuard<'_, ()>, LedgerError> {
        self.vault
            .lock()
            .map_err(|e| StoreError::LockPoisoned(format!("vault: {e}")).into())
    }
}

impl<S: VaultStore + std::fmt::Debug> std::fmt::Debug for VaultLedger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultLedger")
            .field("custody", &self.custody)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
