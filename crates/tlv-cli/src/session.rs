use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tlv_ledger::{
    BankSnapshot, InMemoryBank, InMemoryEnv, InMemoryEventLog, LedgerConfig, LedgerSnapshot,
    RecordedEvent, VaultLedger,
};
use tlv_types::BlockHeight;

/// Everything persisted between CLI invocations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub height: BlockHeight,
    pub ledger: LedgerSnapshot,
    pub bank: BankSnapshot,
    pub events: Vec<RecordedEvent>,
}

/// A ledger loaded from a state file, plus the in-memory host it runs on.
pub struct Session {
    path: PathBuf,
    pub host: InMemoryEnv,
    pub ledger: VaultLedger,
}

impl Session {
    /// Start from empty state. Refuses to clobber an existing file unless `force`.
    pub fn create(
        path: &Path,
        config: LedgerConfig,
        height: Option<BlockHeight>,
        force: bool,
    ) -> anyhow::Result<Self> {
        if path.exists() && !force {
            bail!("state file {} already exists (use --force to overwrite)", path.display());
        }
        let state = SessionState {
            height: height.unwrap_or(config.genesis_height),
            ..SessionState::default()
        };
        Ok(Self::from_state(path, config, state))
    }

    pub fn open(path: &Path, config: LedgerConfig) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| {
            format!("cannot read state file {} (run `tlv init` first)", path.display())
        })?;
        let state: SessionState = serde_json::from_str(&raw)
            .with_context(|| format!("corrupt state file {}", path.display()))?;
        Ok(Self::from_state(path, config, state))
    }

    fn from_state(path: &Path, config: LedgerConfig, state: SessionState) -> Self {
        let host = InMemoryEnv::from_parts(
            InMemoryBank::from_snapshot(state.bank),
            state.height,
            InMemoryEventLog::from_events(state.events),
        );
        let ledger = VaultLedger::restore(config, state.ledger, host.env());
        Self {
            path: path.to_path_buf(),
            host,
            ledger,
        }
    }

    pub fn state(&self) -> anyhow::Result<SessionState> {
        Ok(SessionState {
            height: self.ledger.get_current_block(),
            ledger: self.ledger.snapshot()?,
            bank: self.host.bank.snapshot()?,
            events: self.host.events.events(),
        })
    }

    /// Write state next to the target and rename it into place.
    pub fn save(&self) -> anyhow::Result<()> {
        let state = self.state()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("cannot stage state in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, &state)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)
            .with_context(|| format!("cannot write state file {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlv_ledger::ValueTransfer;
    use tlv_types::{AccountId, VaultRecord};

    #[test]
    fn create_save_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let alice = AccountId::from_label("alice");

        let session = Session::create(&path, LedgerConfig::default(), Some(100), false).unwrap();
        session.host.bank.mint(&alice, 2000).unwrap();
        session.ledger.deposit(&alice, 1500, 110).unwrap();
        session.ledger.increment(&alice).unwrap();
        session.save().unwrap();

        let reopened = Session::open(&path, LedgerConfig::default()).unwrap();
        assert_eq!(reopened.ledger.get_current_block(), 100);
        assert_eq!(reopened.ledger.get_counter().unwrap(), 1);
        assert_eq!(
            reopened.ledger.get_vault_info(&alice).unwrap(),
            VaultRecord::new(1500, 110)
        );
        assert_eq!(reopened.host.bank.balance_of(&alice).unwrap(), 500);
        assert_eq!(reopened.host.events.len(), 2);
        assert_eq!(reopened.ledger.verify_custody().unwrap(), 1500);
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        Session::create(&path, LedgerConfig::default(), None, false)
            .unwrap()
            .save()
            .unwrap();
        assert!(Session::create(&path, LedgerConfig::default(), None, false).is_err());
        assert!(Session::create(&path, LedgerConfig::default(), None, true).is_ok());
    }

    #[test]
    fn create_uses_genesis_height() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig {
            genesis_height: 42,
            ..LedgerConfig::default()
        };
        let session = Session::create(&dir.path().join("s.json"), config, None, false).unwrap();
        assert_eq!(session.ledger.get_current_block(), 42);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::open(&dir.path().join("nope.json"), LedgerConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("tlv init"));
    }
}
