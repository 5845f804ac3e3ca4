//! Declared parameter types and the type-string parser.
//!
//! Supports:
//! - Primitive types: `()`, `bool`, `u8`, `u16`, `u32`, `u64`, `u128`, `u256`, `b256`
//! - Identities: `Address`, `ContractId`, `AssetId`
//! - Strings and bytes: `str[N]`, `String`, `Bytes`
//! - Containers: `Vec<T>`, `Option<T>`, `[T; N]`, `(T1, T2, ...)`
//! - Structs: `struct Name { field: T, ... }`
//!
//! [`ParamType`]'s `Display` output is the canonical spelling used when building
//! function signatures, so `parse(display(t)) == t` for every type.

use std::fmt;
use std::str::FromStr;

use abi_call_types::{AbiError, AbiResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Unit,
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    B256,
    Address,
    ContractId,
    AssetId,
    /// Fixed-length string of exactly N bytes
    StringArray(usize),
    String,
    Bytes,
    Vector(Box<ParamType>),
    Option(Box<ParamType>),
    Array(Box<ParamType>, usize),
    Tuple(Vec<ParamType>),
    Struct {
        name: String,
        fields: Vec<(String, ParamType)>,
    },
}

impl ParamType {
    /// Encoded width in bytes, for types whose encoding has a fixed size.
    ///
    /// Returns None for length-prefixed types (`String`, `Bytes`, `Vec<T>`) and
    /// for `Option<T>`, and for anything containing one of them.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ParamType::Unit => Some(0),
            ParamType::Bool | ParamType::U8 => Some(1),
            ParamType::U16 => Some(2),
            ParamType::U32 => Some(4),
            ParamType::U64 => Some(8),
            ParamType::U128 => Some(16),
            ParamType::U256
            | ParamType::B256
            | ParamType::Address
            | ParamType::ContractId
            | ParamType::AssetId => Some(32),
            ParamType::StringArray(len) => Some(*len),
            ParamType::String | ParamType::Bytes | ParamType::Vector(_) | ParamType::Option(_) => {
                None
            }
            ParamType::Array(inner, len) => inner.fixed_width()?.checked_mul(*len),
            ParamType::Tuple(elements) => elements
                .iter()
                .try_fold(0usize, |acc, t| acc.checked_add(t.fixed_width()?)),
            ParamType::Struct { fields, .. } => fields
                .iter()
                .try_fold(0usize, |acc, (_, t)| acc.checked_add(t.fixed_width()?)),
        }
    }

    pub fn is_fixed_width(&self) -> bool {
        self.fixed_width().is_some()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Unit => write!(f, "()"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::U8 => write!(f, "u8"),
            ParamType::U16 => write!(f, "u16"),
            ParamType::U32 => write!(f, "u32"),
            ParamType::U64 => write!(f, "u64"),
            ParamType::U128 => write!(f, "u128"),
            ParamType::U256 => write!(f, "u256"),
            ParamType::B256 => write!(f, "b256"),
            ParamType::Address => write!(f, "Address"),
            ParamType::ContractId => write!(f, "ContractId"),
            ParamType::AssetId => write!(f, "AssetId"),
            ParamType::StringArray(len) => write!(f, "str[{}]", len),
            ParamType::String => write!(f, "String"),
            ParamType::Bytes => write!(f, "Bytes"),
            ParamType::Vector(inner) => write!(f, "Vec<{}>", inner),
            ParamType::Option(inner) => write!(f, "Option<{}>", inner),
            ParamType::Array(inner, len) => write!(f, "[{}; {}]", inner, len),
            ParamType::Tuple(elements) => {
                write!(f, "(")?;
                for (i, t) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                if elements.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            ParamType::Struct { name, fields } => {
                write!(f, "struct {} {{", name)?;
                for (i, (field, t)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", field, t)?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_param_type(s)
    }
}

/// Parse a type string into a [`ParamType`].
///
/// Fails with `MalformedAbi` naming the type string when it is not recognized.
///
/// # Examples
///
/// ```
/// use abi_interface::param_type::{parse_param_type, ParamType};
///
/// assert_eq!(parse_param_type("u64").unwrap(), ParamType::U64);
/// assert_eq!(
///     parse_param_type("Vec<Address>").unwrap(),
///     ParamType::Vector(Box::new(ParamType::Address))
/// );
/// assert!(parse_param_type("float").is_err());
/// ```
pub fn parse_param_type(type_str: &str) -> AbiResult<ParamType> {
    let s = type_str.trim();
    let unrecognized = || AbiError::malformed(format!("unrecognized type '{}'", type_str.trim()));

    match s {
        "()" => return Ok(ParamType::Unit),
        "bool" => return Ok(ParamType::Bool),
        "u8" => return Ok(ParamType::U8),
        "u16" => return Ok(ParamType::U16),
        "u32" => return Ok(ParamType::U32),
        "u64" => return Ok(ParamType::U64),
        "u128" => return Ok(ParamType::U128),
        "u256" => return Ok(ParamType::U256),
        "b256" => return Ok(ParamType::B256),
        "Address" => return Ok(ParamType::Address),
        "ContractId" => return Ok(ParamType::ContractId),
        "AssetId" => return Ok(ParamType::AssetId),
        "String" => return Ok(ParamType::String),
        "Bytes" => return Ok(ParamType::Bytes),
        _ => {}
    }

    if let Some(len) = s.strip_prefix("str[").and_then(|r| r.strip_suffix(']')) {
        let len = len.trim().parse::<usize>().map_err(|_| unrecognized())?;
        return Ok(ParamType::StringArray(len));
    }

    if let Some(inner) = generic_argument(s, "Vec") {
        return Ok(ParamType::Vector(Box::new(parse_param_type(inner)?)));
    }

    if let Some(inner) = generic_argument(s, "Option") {
        return Ok(ParamType::Option(Box::new(parse_param_type(inner)?)));
    }

    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let parts = split_top_level(inner, ';').ok_or_else(unrecognized)?;
        if parts.len() != 2 {
            return Err(unrecognized());
        }
        let element = parse_param_type(parts[0])?;
        let len = parts[1].parse::<usize>().map_err(|_| unrecognized())?;
        return Ok(ParamType::Array(Box::new(element), len));
    }

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        let parts = split_top_level(inner, ',').ok_or_else(unrecognized)?;
        if parts.is_empty() {
            return Ok(ParamType::Unit);
        }
        let elements = parts
            .into_iter()
            .map(parse_param_type)
            .collect::<AbiResult<Vec<_>>>()?;
        return Ok(ParamType::Tuple(elements));
    }

    if let Some(rest) = s.strip_prefix("struct ") {
        return parse_struct(rest).ok_or_else(unrecognized)?;
    }

    Err(unrecognized())
}

/// Parse the part after `struct `: `Name { a: T, b: U }`.
fn parse_struct(rest: &str) -> Option<AbiResult<ParamType>> {
    let brace = rest.find('{')?;
    let name = rest[..brace].trim();
    let body = rest[brace..].strip_prefix('{')?.strip_suffix('}')?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let mut fields: Vec<(String, ParamType)> = Vec::new();
    for part in split_top_level(body, ',')? {
        let (field, ty) = part.split_once(':')?;
        let field = field.trim();
        if field.is_empty() || fields.iter().any(|(f, _)| f == field) {
            return None;
        }
        match parse_param_type(ty) {
            Ok(t) => fields.push((field.to_string(), t)),
            Err(e) => return Some(Err(e)),
        }
    }

    Some(Ok(ParamType::Struct {
        name: name.to_string(),
        fields,
    }))
}

/// `Vec<T>` -> `T` when `s` is exactly `<wrapper><...>`.
fn generic_argument<'a>(s: &'a str, wrapper: &str) -> Option<&'a str> {
    s.strip_prefix(wrapper)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}

/// Split on `sep` occurrences that are not nested inside any bracket pair.
///
/// Pieces are trimmed; a trailing empty piece (e.g. `(u8,)`) is dropped.
/// Returns None on unbalanced brackets or an empty interior piece.
fn split_top_level(s: &str, sep: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            c if c == sep && depth == 0 => {
                let piece = s[start..i].trim();
                if piece.is_empty() {
                    return None;
                }
                parts.push(piece);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }

    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse_param_type("bool").unwrap(), ParamType::Bool);
        assert_eq!(parse_param_type(" u256 ").unwrap(), ParamType::U256);
        assert_eq!(parse_param_type("()").unwrap(), ParamType::Unit);
        assert_eq!(parse_param_type("b256").unwrap(), ParamType::B256);
        assert_eq!(
            parse_param_type("str[12]").unwrap(),
            ParamType::StringArray(12)
        );
    }

    #[test]
    fn test_parse_nested_containers() {
        let t = parse_param_type("Vec<(u8, [u64; 3], Option<Address>)>").unwrap();
        assert_eq!(
            t,
            ParamType::Vector(Box::new(ParamType::Tuple(vec![
                ParamType::U8,
                ParamType::Array(Box::new(ParamType::U64), 3),
                ParamType::Option(Box::new(ParamType::Address)),
            ])))
        );
    }

    #[test]
    fn test_parse_struct() {
        let t = parse_param_type("struct Point { x: u64, y: u64, tag: str[2] }").unwrap();
        match &t {
            ParamType::Struct { name, fields } => {
                assert_eq!(name, "Point");
                assert_eq!(fields.len(), 3);
                assert_eq!(fields[2], ("tag".to_string(), ParamType::StringArray(2)));
            }
            other => panic!("expected struct, got {:?}", other),
        }
        assert_eq!(t.fixed_width(), Some(18));
    }

    #[test]
    fn test_unrecognized_types() {
        for bad in [
            "float",
            "Vec<float>",
            "str[x]",
            "[u8]",
            "(u8,,u8)",
            "Vec<u8",
            "struct { a: u8 }",
            "struct P { a: u8, a: u8 }",
        ] {
            let err = parse_param_type(bad).unwrap_err();
            assert_eq!(err.kind(), "MalformedAbi", "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_fixed_width() {
        assert_eq!(ParamType::U64.fixed_width(), Some(8));
        assert_eq!(ParamType::Address.fixed_width(), Some(32));
        assert_eq!(
            parse_param_type("[u16; 4]").unwrap().fixed_width(),
            Some(8)
        );
        assert_eq!(
            parse_param_type("(bool, u32)").unwrap().fixed_width(),
            Some(5)
        );
        assert_eq!(ParamType::String.fixed_width(), None);
        assert_eq!(
            parse_param_type("Option<u8>").unwrap().fixed_width(),
            None
        );
        assert_eq!(
            parse_param_type("(u8, Vec<u8>)").unwrap().fixed_width(),
            None
        );
    }

    #[test]
    fn test_display_is_reparseable() {
        for s in [
            "u64",
            "Vec<Address>",
            "[u8; 4]",
            "(u8, bool)",
            "(u64,)",
            "Option<str[3]>",
            "struct Pair { a: u8, b: Vec<u64> }",
        ] {
            let t = parse_param_type(s).unwrap();
            let reparsed = parse_param_type(&t.to_string()).unwrap();
            assert_eq!(reparsed, t, "round trip of {}", s);
        }
    }
}
