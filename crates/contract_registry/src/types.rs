//! Types for the contract registry

use crate::errors::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing an address string.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("address payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Number of raw bytes contained in an address.
pub const ADDRESS_BYTES: usize = 20;

/// Opaque 20-byte contract or account identifier.
///
/// Text form is `0x` followed by 40 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    /// The null address, used as the "not yet deployed" placeholder.
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    pub fn new(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_BYTES]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let payload = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if payload.len() != ADDRESS_BYTES * 2 {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_BYTES * 2,
                actual: payload.len(),
            });
        }

        let mut bytes = [0u8; ADDRESS_BYTES];
        hex::decode_to_slice(payload, &mut bytes)?;
        Ok(Address(bytes))
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(value: [u8; ADDRESS_BYTES]) -> Self {
        Address(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identity of a caller: the registry owner, the deployer, or a component
/// acting from its own address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(pub Address);

impl Principal {
    pub fn new(address: Address) -> Self {
        Self(address)
    }

    pub fn address(&self) -> Address {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Address> for Principal {
    fn from(value: Address) -> Self {
        Principal(value)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A named slot in the address book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    /// Zero while the slot is only reserved
    pub address: Address,
    pub frozen: bool,
}

impl Entry {
    /// Whether the entry is a bootstrap placeholder with no deployed address yet
    pub fn is_reserved(&self) -> bool {
        self.address.is_zero()
    }
}

/// Second name for a canonical entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub alias: String,
    pub canonical: String,
}

/// Reject empty names before they reach any table.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RegistryError::InvalidName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_prefixed_and_bare_hex() {
        let text = "0x00112233445566778899aabbccddeeff00112233";
        let parsed: Address = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);

        let bare: Address = "00112233445566778899AABBCCDDEEFF00112233".parse().unwrap();
        assert_eq!(bare, parsed);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressError::InvalidLength { actual: 4, .. }));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let bad = format!("0x{}", "zz".repeat(ADDRESS_BYTES));
        let err = bad.parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressError::InvalidHex(_)));
    }

    #[test]
    fn address_serializes_as_text() {
        let address = Address([0xab; ADDRESS_BYTES]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(ADDRESS_BYTES)));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn zero_address_is_placeholder() {
        assert!(Address::ZERO.is_zero());
        let entry = Entry {
            name: "TimeProvider".into(),
            address: Address::ZERO,
            frozen: false,
        };
        assert!(entry.is_reserved());
    }
}
