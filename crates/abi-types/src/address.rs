//! 32-byte identities and chain identifiers.
//!
//! Every identity the call layer handles is a 32-byte value, but they're often
//! represented in different formats:
//! - Short form: "0x2"
//! - Full form: "0x0000000000000000000000000000000000000000000000000000000000000002"
//! - Without prefix: "2"
//!
//! [`Address`] is the account address type (spending identities, predicate roots).
//! [`ContractId`], [`AssetId`] and [`Bytes32`] are distinct newtypes so a contract
//! id can never be passed where an asset id is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub use move_core_types::account_address::AccountAddress as Address;

/// Parse a hex identity (short or full form) into raw bytes.
///
/// Returns None for empty, non-hex, or over-long input.
pub fn parse_hex32(value: &str) -> Option<[u8; 32]> {
    let value = value.trim();
    let hex_str = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if hex_str.is_empty() || hex_str.len() > 64 {
        return None;
    }
    let padded = format!("{:0>64}", hex_str);
    let mut out = [0u8; 32];
    hex::decode_to_slice(padded, &mut out).ok()?;
    Some(out)
}

/// Format raw identity bytes in short form (strips leading zeros).
///
/// Example: 0x0000...0002 -> 0x2
pub fn format_short(bytes: &[u8]) -> String {
    let hex = hex::encode(bytes);
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed)
    }
}

macro_rules! fixed_bytes_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const LENGTH: usize = 32;
            pub const ZERO: Self = Self([0u8; 32]);

            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn into_bytes(self) -> [u8; 32] {
                self.0
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Parse short or full hex form, with or without the 0x prefix.
            pub fn from_hex(value: &str) -> Option<Self> {
                parse_hex32(value).map(Self)
            }

            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), format_short(&self.0))
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s).ok_or_else(|| format!("invalid {} '{}'", stringify!($name), s))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes_id!(
    /// Identity of a deployed contract; the target of an invocation.
    ContractId
);
fixed_bytes_id!(
    /// Identity of a native asset forwarded with a call or held by a coin input.
    AssetId
);
fixed_bytes_id!(
    /// Generic 32-byte digest (transaction ids, merkle roots).
    Bytes32
);

impl From<Bytes32> for Address {
    fn from(value: Bytes32) -> Self {
        Address::new(value.into_bytes())
    }
}

/// Network/chain identifier mixed into every predicate root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex32() {
        let bytes = parse_hex32("0x2").unwrap();
        assert_eq!(bytes[31], 2);
        assert!(bytes[..31].iter().all(|b| *b == 0));

        assert!(parse_hex32("").is_none());
        assert!(parse_hex32("0x").is_none());
        assert!(parse_hex32("not-hex").is_none());
        assert!(parse_hex32(&"f".repeat(65)).is_none());
    }

    #[test]
    fn test_format_short() {
        assert_eq!(format_short(&[0u8; 32]), "0x0");
        let mut bytes = [0u8; 32];
        bytes[31] = 0x2a;
        assert_eq!(format_short(&bytes), "0x2a");
    }

    #[test]
    fn test_contract_id_display_and_parse() {
        let id: ContractId = "0x2".parse().unwrap();
        assert_eq!(
            id.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
        assert_eq!(format!("{:?}", id), "ContractId(0x2)");
        assert!("zz".parse::<ContractId>().is_err());
    }

    #[test]
    fn test_contract_id_serde_as_hex() {
        let id = ContractId::new([7u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "07".repeat(32)));
        let restored: ContractId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }

    #[test]
    fn test_chain_id_big_endian() {
        assert_eq!(ChainId::new(1).to_be_bytes(), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(serde_json::to_string(&ChainId(9889)).unwrap(), "9889");
    }
}
