use std::path::Path;

use serde::{Deserialize, Serialize};
use tlv_types::{AccountId, BlockHeight};

use crate::error::ConfigError;

/// Configuration for a [`VaultLedger`](crate::VaultLedger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Label from which the custody account is derived.
    pub custody_label: String,
    /// Also route every event to [`TracingSink`](crate::TracingSink).
    pub trace_events: bool,
    /// Starting height for a fresh [`ManualHeight`](crate::ManualHeight).
    pub genesis_height: BlockHeight,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            custody_label: "tlv-custody".into(),
            trace_events: true,
            genesis_height: 0,
        }
    }
}

impl LedgerConfig {
    /// The account that holds all deposited funds.
    pub fn custody_account(&self) -> AccountId {
        AccountId::from_label(&self.custody_label)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.custody_label.trim().is_empty() {
            return Err(ConfigError::EmptyCustodyLabel);
        }
        Ok(())
    }
}
