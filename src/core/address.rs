/// Ethereum address newtype used as the primary key across the arena
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Raised when an input string is not a 0x-prefixed 40-hex-digit address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid Ethereum address format: {0:?}")]
pub struct AddressParseError(pub String);

/// Canonical wallet address: lowercase `0x` + 40 hex digits.
///
/// Parsing accepts any casing and normalizes to lowercase, so two spellings
/// of the same address always collapse to one map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let trimmed = raw.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError(raw.to_string()))?;

        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError(raw.to_string()));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated `0x1234...abcd` form used for default display names
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[38..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_lowercases_mixed_case() {
        let addr = Address::parse("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").unwrap();
        assert_eq!(addr.as_str(), "0xd8da6bf26964af9d7eed9e03e53415d37aa96045");
    }

    #[test]
    fn accepts_already_lowercase() {
        let addr = Address::parse("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2").unwrap();
        assert_eq!(addr.to_string(), "0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let addr = Address::parse("  0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2 ").unwrap();
        assert_eq!(addr.as_str(), "0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2");
    }

    #[test]
    fn rejects_malformed_inputs() {
        // Missing prefix
        assert!(Address::parse("9f8f72aa9304c8b593d555f12ef6589cc3a579a2").is_err());
        // Too short
        assert!(Address::parse("0x9f8f72aa").is_err());
        // Too long
        assert!(Address::parse("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2ff").is_err());
        // Non-hex characters
        assert!(Address::parse("0x9f8f72aa9304c8b593d555f12ef6589cc3a579zz").is_err());
        // Empty
        assert!(Address::parse("").is_err());
        assert!(Address::parse("0x").is_err());
    }

    #[test]
    fn equal_addresses_hash_to_same_key() {
        use std::collections::HashSet;
        let a = Address::parse("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045").unwrap();
        let b = Address::parse("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap();
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn short_form_keeps_ends() {
        let addr = Address::parse("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap();
        assert_eq!(addr.short(), "0xd8da...6045");
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Address, _> =
            serde_json::from_str("\"0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2\"");
        assert!(ok.is_ok());

        let bad: Result<Address, _> = serde_json::from_str("\"not-an-address\"");
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let addr = Address::parse("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2\"");
    }
}
