//! Holder identities
//!
//! A holder is a 20-byte account identity. The all-zero identity is reserved:
//! it stands for the native base asset when used as a currency, and as the
//! mint source / burn sink in transfer notifications.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Account identity (20 bytes, hex encoded with a `0x` prefix)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The reserved zero identity
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a stable identity from a human-readable label.
    ///
    /// Takes the last 20 bytes of `keccak256(label)`, the same way account
    /// addresses are cut from public key hashes.
    pub fn from_label(label: &str) -> Self {
        let digest = Keccak256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let decoded =
            hex::decode(digits).map_err(|e| LedgerError::InvalidAddress(format!("{}: {}", s, e)))?;

        if decoded.len() != 20 {
            return Err(LedgerError::InvalidAddress(format!(
                "{}: expected 20 bytes, got {}",
                s,
                decoded.len()
            )));
        }

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let addr = Address::from_label("alice");
        let parsed: Address = addr.to_hex().parse().unwrap();
        assert_eq!(addr, parsed);
        assert!(addr.to_hex().starts_with("0x"));
        assert_eq!(addr.to_hex().len(), 42);
    }

    #[test]
    fn test_labels_are_distinct() {
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
        assert!(!Address::from_label("alice").is_zero());
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn test_rejects_bad_length() {
        let result = "0x1234".parse::<Address>();
        assert!(matches!(result, Err(LedgerError::InvalidAddress(_))));
    }

    #[test]
    fn test_zero_sorts_first() {
        let addr = Address::from_label("token");
        assert!(Address::ZERO < addr);
    }

    #[test]
    fn test_json_as_string() {
        let addr = Address::new([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
