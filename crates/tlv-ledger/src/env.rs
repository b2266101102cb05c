use std::sync::Arc;

use tlv_types::BlockHeight;

use crate::height::{HeightOracle, ManualHeight};
use crate::sink::{EventSink, InMemoryEventLog};
use crate::transfer::{InMemoryBank, ValueTransfer};

/// The host capabilities a ledger invocation consumes.
#[derive(Clone)]
pub struct LedgerEnv {
    pub transfers: Arc<dyn ValueTransfer>,
    pub heights: Arc<dyn HeightOracle>,
    pub events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for LedgerEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEnv")
            .field("height", &self.heights.current_height())
            .finish_non_exhaustive()
    }
}

/// Concrete in-memory host: bank, manual height, and event log.
///
/// Keeps typed handles so tests and the CLI can fund accounts, move the
/// height, and read events while the ledger sees only the trait objects.
#[derive(Clone, Debug)]
pub struct InMemoryEnv {
    pub bank: Arc<InMemoryBank>,
    pub heights: Arc<ManualHeight>,
    pub events: Arc<InMemoryEventLog>,
}

impl InMemoryEnv {
    pub fn new(height: BlockHeight) -> Self {
        Self::from_parts(InMemoryBank::new(), height, InMemoryEventLog::new())
    }

    pub fn from_parts(bank: InMemoryBank, height: BlockHeight, events: InMemoryEventLog) -> Self {
        Self {
            bank: Arc::new(bank),
            heights: Arc::new(ManualHeight::new(height)),
            events: Arc::new(events),
        }
    }

    pub fn env(&self) -> LedgerEnv {
        LedgerEnv {
            transfers: self.bank.clone(),
            heights: self.heights.clone(),
            events: self.events.clone(),
        }
    }
}
