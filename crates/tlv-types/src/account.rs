use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Material used to derive an [`AccountId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountMaterial {
    /// An ed25519 public key (32 bytes).
    PublicKey([u8; 32]),
    /// A human-readable label, used by the CLI and tests.
    Label(String),
}

/// Authenticated identity of a ledger account.
///
/// An `AccountId` keys vault records and names the originator of value
/// transfers. It is derived deterministically from [`AccountMaterial`] using
/// BLAKE3, so the same key or label always yields the same account.
///
/// Serializes as a 64-character hex string so it can key JSON maps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId {
    hash: [u8; 32],
}

impl AccountId {
    /// Derive an `AccountId` from account material.
    pub fn derive(material: &AccountMaterial) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tlv-account-v1:");
        match material {
            AccountMaterial::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            AccountMaterial::Label(label) => {
                hasher.update(b"label:");
                hasher.update(label.as_bytes());
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Shorthand for deriving from a label.
    pub fn from_label(label: &str) -> Self {
        Self::derive(&AccountMaterial::Label(label.to_string()))
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("acct:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `acct:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("acct:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { hash: arr })
    }

    /// Resolve user input: a 64-char hex id if it parses, otherwise a label.
    pub fn resolve(input: &str) -> Result<Self, TypeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TypeError::EmptyLabel);
        }
        match Self::from_hex(trimmed) {
            Ok(id) => Ok(id),
            Err(_) => Ok(Self::from_label(trimmed)),
        }
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short_id())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

impl FromStr for AccountId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derive_is_deterministic() {
        let material = AccountMaterial::Label("alice".into());
        assert_eq!(AccountId::derive(&material), AccountId::derive(&material));
    }

    #[test]
    fn key_and_label_are_domain_separated() {
        let bytes = [7u8; 32];
        let from_key = AccountId::derive(&AccountMaterial::PublicKey(bytes));
        let from_label = AccountId::derive(&AccountMaterial::Label(
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
        assert_ne!(from_key, from_label);
    }

    #[test]
    fn short_id_format() {
        let id = AccountId::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(id.short_id(), "acct:abababab");
        assert_eq!(format!("{id}"), "acct:abababab");
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        let err = AccountId::from_hex("abcd").unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 32, actual: 2 });
    }

    #[test]
    fn resolve_prefers_hex_then_label() {
        let alice = AccountId::from_label("alice");
        assert_eq!(AccountId::resolve(&alice.to_hex()).unwrap(), alice);
        assert_eq!(AccountId::resolve("alice").unwrap(), alice);
        assert_eq!(AccountId::resolve("  ").unwrap_err(), TypeError::EmptyLabel);
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = AccountId::from_label("bob");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    proptest! {
        #[test]
        fn hex_parse_inverts_to_hex(bytes in any::<[u8; 32]>()) {
            let encoded = hex::encode(bytes);
            let id = AccountId::from_hex(&encoded).unwrap();
            prop_assert_eq!(id.to_hex(), encoded);
        }
    }
}
