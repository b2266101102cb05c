//! Account-keyed record storage for the Timelock Vault Ledger.
//!
//! The store maps each [`AccountId`](tlv_types::AccountId) to its
//! [`VaultRecord`](tlv_types::VaultRecord). It owns every record; nothing
//! else holds a reference into it.
//!
//! # Storage Backends
//!
//! All backends implement the [`VaultStore`] trait:
//!
//! - [`InMemoryVaultStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Lookups return `Option`; absence is never rewritten as a zero record
//!    here. Callers apply the default.
//! 2. Records are never deleted. A drained account stays at the zero record.
//! 3. The store never interprets balances or heights.
//! 4. All errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryVaultStore;
pub use traits::VaultStore;
