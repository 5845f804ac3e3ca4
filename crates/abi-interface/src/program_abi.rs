//! On-disk ABI document schema.
//!
//! These are the raw serde shapes; no validation happens here. Use
//! [`InterfaceDescriptor::parse`](crate::InterfaceDescriptor::parse) to get a
//! validated, indexed view.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramAbi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_version: Option<String>,
    #[serde(default)]
    pub functions: Vec<AbiFunction>,
    #[serde(default)]
    pub configurables: Vec<AbiConfigurable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiInput>,
    #[serde(default = "unit_type")]
    pub output: String,
    /// Free-form attributes such as `payable` or `storage(read)`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiInput {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiConfigurable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Byte offset into the bytecode. Signed so that a negative value in the
    /// document is reported as malformed instead of failing deserialization.
    #[serde(default)]
    pub offset: Option<i64>,
}

fn unit_type() -> String {
    "()".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_fields() {
        let abi: ProgramAbi = serde_json::from_str(
            r#"{ "functions": [ { "name": "ping" } ], "configurables": [ { "name": "x", "type": "u8" } ] }"#,
        )
        .unwrap();

        assert_eq!(abi.functions[0].output, "()");
        assert!(abi.functions[0].inputs.is_empty());
        assert!(abi.functions[0].attributes.is_empty());
        assert_eq!(abi.configurables[0].offset, None);
    }

    #[test]
    fn test_negative_offset_deserializes() {
        let abi: ProgramAbi = serde_json::from_str(
            r#"{ "configurables": [ { "name": "x", "type": "u8", "offset": -4 } ] }"#,
        )
        .unwrap();
        assert_eq!(abi.configurables[0].offset, Some(-4));
    }
}
