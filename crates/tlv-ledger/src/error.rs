use std::fmt;

use serde::{Deserialize, Serialize};
use tlv_store::StoreError;
use tlv_types::{AccountId, Amount, BlockHeight};

use crate::transfer::TransferError;

/// Stable tag for each failure a ledger operation can report.
///
/// Callers branch on the kind rather than on message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Reserved. No current operation checks for a privileged caller.
    Unauthorized,
    Underflow,
    Overflow,
    InvalidUnlockHeight,
    TooEarly,
    NoFunds,
    TransferFailed,
    CustodyMismatch,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Underflow => "UNDERFLOW",
            Self::Overflow => "OVERFLOW",
            Self::InvalidUnlockHeight => "INVALID_UNLOCK_HEIGHT",
            Self::TooEarly => "TOO_EARLY",
            Self::NoFunds => "NO_FUNDS",
            Self::TransferFailed => "TRANSFER_FAILED",
            Self::CustodyMismatch => "CUSTODY_MISMATCH",
            Self::Store => "STORE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by ledger operations.
///
/// Every error aborts the whole invocation; no storage write from a failed
/// call remains visible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("caller is not authorized")]
    Unauthorized,

    #[error("counter is already zero")]
    Underflow,

    #[error("{what} overflows")]
    Overflow { what: &'static str },

    #[error("unlock height {requested} is not above current height {current}")]
    InvalidUnlockHeight {
        requested: BlockHeight,
        current: BlockHeight,
    },

    #[error("funds locked until height {unlock_height}, current height is {current}")]
    TooEarly {
        unlock_height: BlockHeight,
        current: BlockHeight,
    },

    #[error("no funds held for {account}")]
    NoFunds { account: AccountId },

    #[error("value transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("custody holds {held} but records total {recorded}")]
    CustodyMismatch { held: Amount, recorded: Amount },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// The stable tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Underflow => ErrorKind::Underflow,
            Self::Overflow { .. } => ErrorKind::Overflow,
            Self::InvalidUnlockHeight { .. } => ErrorKind::InvalidUnlockHeight,
            Self::TooEarly { .. } => ErrorKind::TooEarly,
            Self::NoFunds { .. } => ErrorKind::NoFunds,
            Self::TransferFailed(_) => ErrorKind::TransferFailed,
            Self::CustodyMismatch { .. } => ErrorKind::CustodyMismatch,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}

/// Errors from loading a [`LedgerConfig`](crate::LedgerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("custody label must not be empty")]
    EmptyCustodyLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_use_wire_tags() {
        assert_eq!(LedgerError::Underflow.kind().as_str(), "UNDERFLOW");
        assert_eq!(
            LedgerError::TooEarly {
                unlock_height: 10,
                current: 9
            }
            .kind()
            .to_string(),
            "TOO_EARLY"
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::InvalidUnlockHeight).unwrap(),
            "\"INVALID_UNLOCK_HEIGHT\""
        );
    }

    #[test]
    fn transfer_errors_convert() {
        let err: LedgerError = TransferError::Unavailable("offline".into()).into();
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
    }

    #[test]
    fn display_includes_heights() {
        let err = LedgerError::InvalidUnlockHeight {
            requested: 100,
            current: 100,
        };
        assert_eq!(
            err.to_string(),
            "unlock height 100 is not above current height 100"
        );
    }
}
