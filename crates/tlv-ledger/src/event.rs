use serde::{Deserialize, Serialize};

use tlv_types::{AccountId, Amount, BlockHeight};

/// Structured record emitted by each successful state-changing operation.
///
/// Serializes as a flat JSON object tagged by `"event"`, e.g.
/// `{"event":"deposit","user":"…","amount":1000,…}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LedgerEvent {
    CounterIncremented {
        caller: AccountId,
        new_value: u64,
        height: BlockHeight,
    },
    CounterDecremented {
        caller: AccountId,
        new_value: u64,
        height: BlockHeight,
    },
    Deposit {
        user: AccountId,
        amount: Amount,
        new_balance: Amount,
        unlock_block: BlockHeight,
        current_block: BlockHeight,
    },
    Withdraw {
        user: AccountId,
        amount: Amount,
        unlock_block: BlockHeight,
        current_block: BlockHeight,
    },
}

impl LedgerEvent {
    /// The `"event"` tag this record serializes with.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CounterIncremented { .. } => "counter-incremented",
            Self::CounterDecremented { .. } => "counter-decremented",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
        }
    }

    /// The invoking account.
    pub fn account(&self) -> &AccountId {
        match self {
            Self::CounterIncremented { caller, .. } | Self::CounterDecremented { caller, .. } => {
                caller
            }
            Self::Deposit { user, .. } | Self::Withdraw { user, .. } => user,
        }
    }

    /// Height at which the emitting invocation ran.
    pub fn height(&self) -> BlockHeight {
        match self {
            Self::CounterIncremented { height, .. } | Self::CounterDecremented { height, .. } => {
                *height
            }
            Self::Deposit { current_block, .. } | Self::Withdraw { current_block, .. } => {
                *current_block
            }
        }
    }
}

/// An event as retained by an event log.
///
/// `id` is a BLAKE3 hash over the sequence number and the event content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Position in the log (1-based).
    pub seq: u64,
    /// Hex-encoded content hash.
    pub id: String,
    pub event: LedgerEvent,
}

impl RecordedEvent {
    pub fn new(seq: u64, event: LedgerEvent) -> Self {
        let id = hex::encode(Self::compute_id(seq, &event));
        Self { seq, id, event }
    }

    /// Short hex representation (first 8 hex chars).
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// Returns `true` if `id` matches the content.
    pub fn verify_integrity(&self) -> bool {
        hex::encode(Self::compute_id(self.seq, &self.event)) == self.id
    }

    fn compute_id(seq: u64, event: &LedgerEvent) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tlv-event-v1:");
        hasher.update(&seq.to_le_bytes());
        if let Ok(bytes) = serde_json::to_vec(event) {
            hasher.update(&bytes);
        }
        *hasher.finalize().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn alice() -> AccountId {
        AccountId::from_label("alice")
    }

    #[test]
    fn deposit_serializes_flat_with_tag() {
        let event = LedgerEvent::Deposit {
            user: alice(),
            amount: 1000,
            new_balance: 1500,
            unlock_block: 120,
            current_block: 100,
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "deposit",
                "user": alice().to_hex(),
                "amount": 1000,
                "new_balance": 1500,
                "unlock_block": 120,
                "current_block": 100,
            })
        );
    }

    #[test]
    fn counter_tags_are_kebab_case() {
        let event = LedgerEvent::CounterDecremented {
            caller: alice(),
            new_value: 2,
            height: 7,
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "counter-decremented");
        assert_eq!(value["event"], event.name());
        assert_eq!(event.height(), 7);
        assert_eq!(event.account(), &alice());
    }

    #[test]
    fn recorded_event_detects_tampering() {
        let mut recorded = RecordedEvent::new(
            1,
            LedgerEvent::Withdraw {
                user: alice(),
                amount: 1000,
                unlock_block: 110,
                current_block: 110,
            },
        );
        assert!(recorded.verify_integrity());
        assert_eq!(recorded.short_id().len(), 8);

        if let LedgerEvent::Withdraw { amount, .. } = &mut recorded.event {
            *amount = 1;
        }
        assert!(!recorded.verify_integrity());
    }

    #[test]
    fn sequence_number_changes_id() {
        let event = LedgerEvent::CounterIncremented {
            caller: alice(),
            new_value: 1,
            height: 0,
        };
        assert_ne!(
            RecordedEvent::new(1, event.clone()).id,
            RecordedEvent::new(2, event).id
        );
    }
}
