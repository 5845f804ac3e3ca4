//! Serde adapters for byte fields in requests and receipts.
//!
//! Byte buffers serialize as base64 strings, selectors as 0x-prefixed hex.

/// Encode bytes as a 0x-prefixed lowercase hex string.
pub fn bytes_to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Serde adapter: `Vec<u8>` as a base64 string.
pub mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(&s)
            .map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: an 8-byte selector as a 0x-prefixed hex string.
pub mod hex_selector {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(selector: &[u8; 8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::bytes_to_hex_prefixed(selector))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 8], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let mut out = [0u8; 8];
        hex::decode_to_slice(s, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_hex_adapter() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Holder {
            #[serde(with = "hex_selector")]
            selector: [u8; 8],
        }

        let holder = Holder {
            selector: [0, 1, 2, 3, 4, 5, 6, 0xff],
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"selector":"0x00010203040506ff"}"#);
        assert_eq!(serde_json::from_str::<Holder>(&json).unwrap(), holder);
        assert!(serde_json::from_str::<Holder>(r#"{"selector":"0x0102"}"#).is_err());
    }

    #[test]
    fn test_base64_bytes_adapter() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Holder {
            #[serde(with = "base64_bytes")]
            data: Vec<u8>,
        }

        let holder = Holder {
            data: b"hello world".to_vec(),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"data":"aGVsbG8gd29ybGQ="}"#);
        let restored: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, holder);
    }
}
