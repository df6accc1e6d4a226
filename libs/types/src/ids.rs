//! Identifier types for escrow participants and swaps
//!
//! Accounts and asset contracts share one 20-byte address space with a
//! distinguished zero value. Swaps are numbered by a monotonically
//! increasing counter starting at 1.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a specific non-fungible asset instance within its contract.
pub type TokenId = u128;

/// Amount of native value in its smallest unit.
pub type Wei = u128;

/// Errors raised when parsing an [`Address`] from text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddressParseError {
    #[error("Invalid hex in address: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Account or contract address
///
/// The all-zero address is the null identity; it is never a valid
/// acceptor or asset contract.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The null address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Byte length of an address.
    pub const LEN: usize = 20;

    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Create an address whose low 8 bytes hold `value` (big-endian).
    pub fn from_low_u64_be(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the null address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits)?;
        let bytes: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a swap commitment
///
/// Issued once per successful initiation and never reused, even after the
/// swap is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapId(u64);

impl SwapId {
    /// First identifier handed out by a fresh escrow.
    pub const FIRST: SwapId = SwapId(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier issued after this one, or `None` on counter exhaustion.
    pub fn checked_next(&self) -> Option<SwapId> {
        self.0.checked_add(1).map(SwapId)
    }
}

impl Default for SwapId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::default().is_zero());
        assert!(!Address::from_low_u64_be(1).is_zero());
    }

    #[test]
    fn test_address_display_and_parse() {
        let addr = Address::from_low_u64_be(0xdead_beef);
        let text = addr.to_string();
        assert_eq!(text, "0x00000000000000000000000000000000deadbeef");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(
            "00000000000000000000000000000000deadbeef"
                .parse::<Address>()
                .unwrap(),
            addr
        );
    }

    #[test]
    fn test_address_parse_wrong_length() {
        let result = "0xdeadbeef".parse::<Address>();
        assert_eq!(result, Err(AddressParseError::InvalidLength(4)));
    }

    #[test]
    fn test_address_parse_invalid_hex() {
        let result = "0xzz00000000000000000000000000000000000000".parse::<Address>();
        assert!(matches!(result, Err(AddressParseError::InvalidHex(_))));
    }

    #[test]
    fn test_address_serialization() {
        let addr = Address::from_low_u64_be(7);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000007\"");

        let deserialized: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, deserialized);
    }

    #[test]
    fn test_swap_id_sequence() {
        let first = SwapId::FIRST;
        assert_eq!(first.value(), 1);
        assert_eq!(first.checked_next(), Some(SwapId::new(2)));
        assert_eq!(SwapId::new(u64::MAX).checked_next(), None);
    }

    #[test]
    fn test_swap_id_serialization() {
        let id = SwapId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let deserialized: SwapId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
