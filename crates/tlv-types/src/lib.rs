//! Foundation types for the Timelock Vault Ledger (TLV).
//!
//! This crate provides the identity and record types shared by every other
//! TLV crate.
//!
//! # Key Types
//!
//! - [`AccountId`] -- Account identity derived from a public key or label (BLAKE3)
//! - [`VaultRecord`] -- Balance held in custody plus its unlock height
//! - [`Amount`] / [`BlockHeight`] -- Unsigned integer aliases

pub mod account;
pub mod error;
pub mod record;

pub use account::{AccountId, AccountMaterial};
pub use error::TypeError;
pub use record::VaultRecord;

/// Fungible amount held in custody or moved by a transfer.
pub type Amount = u64;

/// Block height reported by the host ledger.
pub type BlockHeight = u64;
