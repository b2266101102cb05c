//! Ledger state machine for the Timelock Vault Ledger (TLV).
//!
//! This crate is the heart of TLV. It provides:
//! - `VaultLedger`: the global counter plus per-account timelocked custody
//! - The external seams an invocation consumes: `ValueTransfer`,
//!   `HeightOracle`, and `EventSink`
//! - In-memory implementations of each seam for tests and embedding
//! - `LedgerConfig` loaded from TOML
//! - `LedgerSnapshot` for persisting state between processes

pub mod config;
pub mod env;
pub mod error;
pub mod event;
pub mod height;
pub mod ledger;
pub mod sink;
pub mod snapshot;
pub mod transfer;

pub use config::LedgerConfig;
pub use env::{InMemoryEnv, LedgerEnv};
pub use error::{ConfigError, ErrorKind, LedgerError};
pub use event::{LedgerEvent, RecordedEvent};
pub use height::{HeightOracle, ManualHeight};
pub use ledger::VaultLedger;
pub use sink::{EventSink, InMemoryEventLog, TracingSink};
pub use snapshot::LedgerSnapshot;
pub use transfer::{BankSnapshot, InMemoryBank, TransferError, ValueTransfer};
