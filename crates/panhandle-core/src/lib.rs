// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PANHANDLE - CORE MODULE
//
// Primitives shared by every Panhandle contract: 20-byte addresses, the
// contract error taxonomy, owner/operator access control, basis-point rate
// math and the TOML deployment configuration.
// All token arithmetic uses u128 atomic units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod access;
pub mod address;
pub mod config;
pub mod error;
pub mod math;

pub use access::{OperatorRole, OperatorSet, Ownable};
pub use address::Address;
pub use config::TokenConfig;
pub use error::{ContractError, ContractResult, ErrorKind};

/// Basis-point denominator (10_000 bps = 100%)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Burn rate denominator: the burn share is a percentage of the tax itself
pub const PERCENT_DENOMINATOR: u128 = 100;

/// One whole token at 18 decimals
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Serde adapter for u128 ↔ decimal string.
/// JSON and TOML have no native 128-bit integers, so amounts travel as strings.
/// Deserialization also accepts plain integers for hand-written files.
pub mod u128_str {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a u128 as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                if v >= 0 {
                    Ok(v as u128)
                } else {
                    Err(E::custom("negative value for u128"))
                }
            }
        }

        d.deserialize_any(U128Visitor)
    }
}
