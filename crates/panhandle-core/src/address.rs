// SPDX-License-Identifier: AGPL-3.0-only
//! # Addresses
//!
//! 20-byte account / contract identifiers rendered as `0x` + 40 hex chars.
//!
//! Two addresses are reserved:
//! - [`Address::ZERO`]: the null address; never a valid role holder or recipient
//! - [`Address::BURN`]: `0x…dEaD`, the unspendable sink that burned tokens move to

use crate::error::{ContractError, ContractResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Address length in bytes
pub const ADDRESS_LEN: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Burn sink `0x000000000000000000000000000000000000dEaD`.
    pub const BURN: Address = Address([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xde, 0xad,
    ]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }

    /// Deterministic address for a named account: first 20 bytes of `blake3(label)`.
    pub fn from_seed(label: &str) -> Self {
        let hash = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash.as_bytes()[..ADDRESS_LEN]);
        Address(bytes)
    }

    /// Contract address derived from `blake3(deployer || nonce)`.
    pub fn for_contract(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&deployer.0);
        hasher.update(&nonce.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash.as_bytes()[..ADDRESS_LEN]);
        Address(bytes)
    }

    /// Parse `0x`-prefixed (or bare) hex, either case.
    pub fn parse(s: &str) -> ContractResult<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(ContractError::InvalidArgument(format!(
                "invalid address length: {}",
                s
            )));
        }
        let raw = hex::decode(digits)
            .map_err(|e| ContractError::InvalidArgument(format!("invalid address {}: {}", s, e)))?;
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Address(bytes))
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
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burn_address_matches_dead() {
        let parsed = Address::parse("0x000000000000000000000000000000000000dEaD").unwrap();
        assert_eq!(parsed, Address::BURN);
        assert_eq!(
            Address::BURN.to_string(),
            "0x000000000000000000000000000000000000dead"
        );
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::BURN.is_zero());
        assert_eq!(
            Address::parse("0x0000000000000000000000000000000000000000").unwrap(),
            Address::ZERO
        );
    }

    #[test]
    fn test_parse_without_prefix() {
        let a = Address::from_seed("alice");
        let bare = a.to_string().trim_start_matches("0x").to_string();
        assert_eq!(Address::parse(&bare).unwrap(), a);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzz00000000000000000000000000000000000000").is_err());
        assert_eq!(
            Address::parse("").unwrap_err().kind(),
            crate::ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_from_seed_deterministic() {
        assert_eq!(Address::from_seed("bob"), Address::from_seed("bob"));
        assert_ne!(Address::from_seed("bob"), Address::from_seed("carol"));
    }

    #[test]
    fn test_contract_address_depends_on_nonce() {
        let owner = Address::from_seed("owner");
        assert_ne!(
            Address::for_contract(&owner, 0),
            Address::for_contract(&owner, 1)
        );
        assert_eq!(
            Address::for_contract(&owner, 7),
            Address::for_contract(&owner, 7)
        );
    }

    #[test]
    fn test_serde_as_hex_string() {
        let a = Address::from_seed("carol");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
