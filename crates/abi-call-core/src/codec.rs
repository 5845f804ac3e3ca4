//! Codec boundary and the canonical binary codec.
//!
//! The call layer decides *where* encoded values go (argument order, patch
//! offsets, segment layout). *How* a value becomes bytes is delegated to an
//! [`AbiCodec`]. [`CanonicalCodec`] is the default:
//!
//! - integers little-endian in their natural width, `u256` as 32 raw bytes
//! - `bool` as one byte (0/1), `()` as nothing
//! - 32-byte ids raw, `str[N]` as exactly N bytes
//! - `String`, `Bytes`, `Vec<T>` with a ULEB128 length prefix
//! - `Option<T>` as a tag byte (0 none, 1 some) then the value
//! - arrays, tuples and structs element by element in declaration order
//!
//! Decoding never trusts an element count beyond what the remaining input can
//! hold. Elements of a zero-sized type consume no input, so their count is
//! capped at [`MAX_ZERO_SIZED_ELEMENTS`].

use abi_call_types::{AbiError, AbiResult, Address, AssetId, Bytes32, ContractId};
use abi_interface::ParamType;

// =============================================================================
// Values
// =============================================================================

/// A typed value handed to or returned from the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Unit,
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    /// Stored as raw bytes
    U256([u8; 32]),
    B256(Bytes32),
    Address(Address),
    ContractId(ContractId),
    AssetId(AssetId),
    StringArray(String),
    String(String),
    Bytes(Vec<u8>),
    Vector(Vec<Token>),
    Option(Option<Box<Token>>),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
    /// Field values in declaration order
    Struct(Vec<Token>),
}

impl Token {
    /// Variant name, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Unit => "Unit",
            Token::Bool(_) => "Bool",
            Token::U8(_) => "U8",
            Token::U16(_) => "U16",
            Token::U32(_) => "U32",
            Token::U64(_) => "U64",
            Token::U128(_) => "U128",
            Token::U256(_) => "U256",
            Token::B256(_) => "B256",
            Token::Address(_) => "Address",
            Token::ContractId(_) => "ContractId",
            Token::AssetId(_) => "AssetId",
            Token::StringArray(_) => "StringArray",
            Token::String(_) => "String",
            Token::Bytes(_) => "Bytes",
            Token::Vector(_) => "Vector",
            Token::Option(_) => "Option",
            Token::Array(_) => "Array",
            Token::Tuple(_) => "Tuple",
            Token::Struct(_) => "Struct",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Token::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Token::Address(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_contract_id(&self) -> Option<ContractId> {
        match self {
            Token::ContractId(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) | Token::StringArray(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a vector, array, tuple or struct.
    pub fn as_slice(&self) -> Option<&[Token]> {
        match self {
            Token::Vector(v) | Token::Array(v) | Token::Tuple(v) | Token::Struct(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! token_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Token {
                fn from(value: $ty) -> Self {
                    Token::$variant(value)
                }
            }
        )*
    };
}

token_from! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    Bytes32 => B256,
    Address => Address,
    ContractId => ContractId,
    AssetId => AssetId,
    String => String,
    Vec<u8> => Bytes,
}

impl From<()> for Token {
    fn from(_: ()) -> Self {
        Token::Unit
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::String(value.to_string())
    }
}

impl<T: Into<Token>> From<Option<T>> for Token {
    fn from(value: Option<T>) -> Self {
        Token::Option(value.map(|v| Box::new(v.into())))
    }
}

// =============================================================================
// Codec boundary
// =============================================================================

/// Encodes and decodes values against declared types.
pub trait AbiCodec: Send + Sync {
    fn encode(&self, param_type: &ParamType, token: &Token) -> AbiResult<Vec<u8>>;

    /// Decode exactly one value; trailing bytes are an error.
    fn decode(&self, param_type: &ParamType, bytes: &[u8]) -> AbiResult<Token>;

    /// Encode a sequence of values back to back.
    fn encode_all(&self, types: &[&ParamType], tokens: &[Token]) -> AbiResult<Vec<u8>> {
        if types.len() != tokens.len() {
            return Err(AbiError::codec(
                "arguments",
                format!("{} types but {} values", types.len(), tokens.len()),
            ));
        }
        let mut out = Vec::new();
        for (param_type, token) in types.iter().zip(tokens) {
            out.extend(self.encode(param_type, token)?);
        }
        Ok(out)
    }
}

/// The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalCodec;

impl AbiCodec for CanonicalCodec {
    fn encode(&self, param_type: &ParamType, token: &Token) -> AbiResult<Vec<u8>> {
        let mut encoder = CanonicalEncoder::new();
        encoder.encode_value(param_type, token)?;
        Ok(encoder.output)
    }

    fn decode(&self, param_type: &ParamType, bytes: &[u8]) -> AbiResult<Token> {
        let mut decoder = CanonicalDecoder::new(bytes);
        let token = decoder.decode(param_type)?;
        if decoder.cursor != bytes.len() {
            return Err(AbiError::codec(
                param_type.to_string(),
                format!(
                    "{} trailing byte(s) after value",
                    bytes.len() - decoder.cursor
                ),
            ));
        }
        Ok(token)
    }
}

// =============================================================================
// Encoder
// =============================================================================

struct CanonicalEncoder {
    output: Vec<u8>,
}

impl CanonicalEncoder {
    fn new() -> Self {
        Self { output: Vec::new() }
    }

    fn encode_value(&mut self, param_type: &ParamType, token: &Token) -> AbiResult<()> {
        match (param_type, token) {
            (ParamType::Unit, Token::Unit) => {}
            (ParamType::Bool, Token::Bool(b)) => self.output.push(u8::from(*b)),
            (ParamType::U8, Token::U8(v)) => self.output.push(*v),
            (ParamType::U16, Token::U16(v)) => self.output.extend_from_slice(&v.to_le_bytes()),
            (ParamType::U32, Token::U32(v)) => self.output.extend_from_slice(&v.to_le_bytes()),
            (ParamType::U64, Token::U64(v)) => self.output.extend_from_slice(&v.to_le_bytes()),
            (ParamType::U128, Token::U128(v)) => self.output.extend_from_slice(&v.to_le_bytes()),
            (ParamType::U256, Token::U256(bytes)) => self.output.extend_from_slice(bytes),
            (ParamType::B256, Token::B256(v)) => self.output.extend_from_slice(v.as_bytes()),
            (ParamType::Address, Token::Address(v)) => self.output.extend_from_slice(v.as_ref()),
            (ParamType::ContractId, Token::ContractId(v)) => {
                self.output.extend_from_slice(v.as_bytes())
            }
            (ParamType::AssetId, Token::AssetId(v)) => self.output.extend_from_slice(v.as_bytes()),
            (ParamType::StringArray(len), Token::StringArray(s) | Token::String(s)) => {
                if s.len() != *len {
                    return Err(AbiError::codec(
                        param_type.to_string(),
                        format!("string is {} bytes, expected exactly {}", s.len(), len),
                    ));
                }
                self.output.extend_from_slice(s.as_bytes());
            }
            (ParamType::String, Token::String(s)) => {
                self.write_uleb128(s.len() as u64);
                self.output.extend_from_slice(s.as_bytes());
            }
            (ParamType::Bytes, Token::Bytes(bytes)) => {
                self.write_uleb128(bytes.len() as u64);
                self.output.extend_from_slice(bytes);
            }
            (ParamType::Vector(inner), Token::Vector(elements)) => {
                self.write_uleb128(elements.len() as u64);
                for element in elements {
                    self.encode_value(inner, element)?;
                }
            }
            (ParamType::Option(inner), Token::Option(value)) => match value {
                None => self.output.push(0),
                Some(value) => {
                    self.output.push(1);
                    self.encode_value(inner, value)?;
                }
            },
            (ParamType::Array(inner, len), Token::Array(elements)) => {
                if elements.len() != *len {
                    return Err(AbiError::codec(
                        param_type.to_string(),
                        format!("array has {} element(s), expected {}", elements.len(), len),
                    ));
                }
                for element in elements {
                    self.encode_value(inner, element)?;
                }
            }
            (ParamType::Tuple(types), Token::Tuple(elements)) => {
                if elements.len() != types.len() {
                    return Err(AbiError::codec(
                        param_type.to_string(),
                        format!(
                            "tuple has {} element(s), expected {}",
                            elements.len(),
                            types.len()
                        ),
                    ));
                }
                for (t, element) in types.iter().zip(elements) {
                    self.encode_value(t, element)?;
                }
            }
            (ParamType::Struct { fields, .. }, Token::Struct(values)) => {
                if values.len() != fields.len() {
                    return Err(AbiError::codec(
                        param_type.to_string(),
                        format!(
                            "struct has {} field value(s), expected {}",
                            values.len(),
                            fields.len()
                        ),
                    ));
                }
                for ((_, t), value) in fields.iter().zip(values) {
                    self.encode_value(t, value)?;
                }
            }
            (expected, token) => {
                return Err(AbiError::codec(
                    expected.to_string(),
                    format!("cannot encode a {} value", token.kind()),
                ))
            }
        }
        Ok(())
    }

    fn write_uleb128(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.output.push(byte);
                break;
            }
            self.output.push(byte | 0x80);
        }
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Most elements of a zero-sized type (`()`, `str[0]`, `[T; 0]`) a sequence may decode to.
pub const MAX_ZERO_SIZED_ELEMENTS: usize = 1 << 16;

/// Fewest bytes any value of `param_type` encodes to.
fn min_encoded_len(param_type: &ParamType) -> usize {
    if let Some(width) = param_type.fixed_width() {
        return width;
    }
    match param_type {
        // length prefix or tag byte
        ParamType::String | ParamType::Bytes | ParamType::Vector(_) | ParamType::Option(_) => 1,
        ParamType::Array(inner, len) => min_encoded_len(inner).saturating_mul(*len),
        ParamType::Tuple(elements) => elements
            .iter()
            .fold(0usize, |acc, t| acc.saturating_add(min_encoded_len(t))),
        ParamType::Struct { fields, .. } => fields
            .iter()
            .fold(0usize, |acc, (_, t)| acc.saturating_add(min_encoded_len(t))),
        _ => 0,
    }
}

struct CanonicalDecoder<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> CanonicalDecoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    fn decode(&mut self, param_type: &ParamType) -> AbiResult<Token> {
        let token = match param_type {
            ParamType::Unit => Token::Unit,
            ParamType::Bool => match self.read_u8(param_type)? {
                0 => Token::Bool(false),
                1 => Token::Bool(true),
                other => {
                    return Err(AbiError::codec(
                        "bool",
                        format!("invalid bool byte {:#04x}", other),
                    ))
                }
            },
            ParamType::U8 => Token::U8(self.read_u8(param_type)?),
            ParamType::U16 => Token::U16(u16::from_le_bytes(self.read_array(param_type)?)),
            ParamType::U32 => Token::U32(u32::from_le_bytes(self.read_array(param_type)?)),
            ParamType::U64 => Token::U64(u64::from_le_bytes(self.read_array(param_type)?)),
            ParamType::U128 => Token::U128(u128::from_le_bytes(self.read_array(param_type)?)),
            ParamType::U256 => Token::U256(self.read_array(param_type)?),
            ParamType::B256 => Token::B256(Bytes32::new(self.read_array(param_type)?)),
            ParamType::Address => Token::Address(Address::new(self.read_array(param_type)?)),
            ParamType::ContractId => {
                Token::ContractId(ContractId::new(self.read_array(param_type)?))
            }
            ParamType::AssetId => Token::AssetId(AssetId::new(self.read_array(param_type)?)),
            ParamType::StringArray(len) => {
                let bytes = self.read_bytes(*len, param_type)?;
                Token::StringArray(utf8(bytes, param_type)?)
            }
            ParamType::String => {
                let len = self.read_length(param_type)?;
                let bytes = self.read_bytes(len, param_type)?;
                Token::String(utf8(bytes, param_type)?)
            }
            ParamType::Bytes => {
                let len = self.read_length(param_type)?;
                Token::Bytes(self.read_bytes(len, param_type)?.to_vec())
            }
            ParamType::Vector(inner) => {
                let len = self.read_length(param_type)?;
                self.check_element_count(len, inner, param_type)?;
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(self.decode(inner)?);
                }
                Token::Vector(elements)
            }
            ParamType::Option(inner) => match self.read_u8(param_type)? {
                0 => Token::Option(None),
                1 => Token::Option(Some(Box::new(self.decode(inner)?))),
                other => {
                    return Err(AbiError::codec(
                        param_type.to_string(),
                        format!("invalid option tag {:#04x}", other),
                    ))
                }
            },
            ParamType::Array(inner, len) => {
                self.check_element_count(*len, inner, param_type)?;
                let mut elements = Vec::with_capacity(*len);
                for _ in 0..*len {
                    elements.push(self.decode(inner)?);
                }
                Token::Array(elements)
            }
            ParamType::Tuple(types) => Token::Tuple(
                types
                    .iter()
                    .map(|t| self.decode(t))
                    .collect::<AbiResult<Vec<_>>>()?,
            ),
            ParamType::Struct { fields, .. } => Token::Struct(
                fields
                    .iter()
                    .map(|(_, t)| self.decode(t))
                    .collect::<AbiResult<Vec<_>>>()?,
            ),
        };
        Ok(token)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn check_element_count(
        &self,
        count: usize,
        element: &ParamType,
        param_type: &ParamType,
    ) -> AbiResult<()> {
        let fits = match min_encoded_len(element) {
            0 => count <= MAX_ZERO_SIZED_ELEMENTS,
            min => count <= self.remaining() / min,
        };
        if fits {
            return Ok(());
        }
        Err(AbiError::codec(
            param_type.to_string(),
            format!(
                "{} element(s) of {} cannot fit in {} remaining byte(s)",
                count,
                element,
                self.remaining()
            ),
        ))
    }

    fn read_u8(&mut self, param_type: &ParamType) -> AbiResult<u8> {
        Ok(self.read_bytes(1, param_type)?[0])
    }

    fn read_array<const N: usize>(&mut self, param_type: &ParamType) -> AbiResult<[u8; N]> {
        let bytes = self.read_bytes(N, param_type)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn read_bytes(&mut self, n: usize, param_type: &ParamType) -> AbiResult<&'a [u8]> {
        let end = self
            .cursor
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                AbiError::codec(
                    param_type.to_string(),
                    format!(
                        "unexpected end of data: need {} bytes at offset {}, have {}",
                        n,
                        self.cursor,
                        self.data.len()
                    ),
                )
            })?;
        let data: &'a [u8] = self.data;
        let slice = &data[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    fn read_length(&mut self, param_type: &ParamType) -> AbiResult<usize> {
        let len = self.read_uleb128(param_type)?;
        usize::try_from(len).map_err(|_| {
            AbiError::codec(param_type.to_string(), format!("length {} too large", len))
        })
    }

    fn read_uleb128(&mut self, param_type: &ParamType) -> AbiResult<u64> {
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.read_u8(param_type)?;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 63 {
                return Err(AbiError::codec(param_type.to_string(), "ULEB128 overflow"));
            }
        }
        Ok(result)
    }
}

fn utf8(bytes: &[u8], param_type: &ParamType) -> AbiResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| AbiError::codec(param_type.to_string(), format!("invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    fn ty(s: &str) -> ParamType {
        s.parse().unwrap()
    }

    #[test]
    fn test_hostile_length_prefix_is_rejected() {
        let codec = CanonicalCodec;

        // 2^24 units from four bytes
        let err = codec.decode(&ty("Vec<()>"), &[0x80, 0x80, 0x80, 0x08]).unwrap_err();
        assert_eq!(err.kind(), "Codec");

        // 1000 u64s announced, one present
        let mut data = vec![0xe8, 0x07];
        data.extend_from_slice(&1u64.to_le_bytes());
        let err = codec.decode(&ty("Vec<u64>"), &data).unwrap_err();
        assert_eq!(err.kind(), "Codec");

        // Each String needs at least its length byte
        let err = codec.decode(&ty("Vec<String>"), &[0x05, 0x00, 0x00]).unwrap_err();
        assert_eq!(err.kind(), "Codec");
    }

    #[test]
    fn test_small_zero_sized_vector_still_decodes() {
        let codec = CanonicalCodec;
        let units = Token::Vector(vec![Token::Unit; 3]);
        let encoded = codec.encode(&ty("Vec<()>"), &units).unwrap();
        assert_eq!(encoded, vec![3]);
        assert_eq!(codec.decode(&ty("Vec<()>"), &encoded).unwrap(), units);
    }

    #[test]
    fn test_primitive_layouts() {
        let codec = CanonicalCodec;
        assert_eq!(codec.encode(&ty("u64"), &Token::U64(100)).unwrap(), 100u64.to_le_bytes());
        assert_eq!(codec.encode(&ty("u16"), &Token::U16(0x0102)).unwrap(), vec![0x02, 0x01]);
        assert_eq!(codec.encode(&ty("bool"), &Token::Bool(true)).unwrap(), vec![1]);
        assert!(codec.encode(&ty("()"), &Token::Unit).unwrap().is_empty());
        assert_eq!(
            codec.encode(&ty("str[3]"), &Token::from("abc")).unwrap(),
            b"abc".to_vec()
        );
        assert_eq!(
            codec
                .encode(&ty("ContractId"), &Token::ContractId(ContractId::new([5u8; 32])))
                .unwrap(),
            vec![5u8; 32]
        );
    }

    #[test]
    fn test_fixed_types_match_declared_width() {
        let codec = CanonicalCodec;
        let cases = [
            ("u8", Token::U8(1)),
            ("u32", Token::U32(7)),
            ("u128", Token::U128(9)),
            ("b256", Token::B256(Bytes32::new([1u8; 32]))),
            ("[u16; 3]", Token::Array(vec![Token::U16(1), Token::U16(2), Token::U16(3)])),
            ("(bool, u64)", Token::Tuple(vec![Token::Bool(false), Token::U64(2)])),
        ];
        for (type_str, token) in cases {
            let param_type = ty(type_str);
            let encoded = codec.encode(&param_type, &token).unwrap();
            assert_eq!(Some(encoded.len()), param_type.fixed_width(), "{}", type_str);
        }
    }

    #[test]
    fn test_type_mismatch_is_codec_error() {
        let err = CanonicalCodec.encode(&ty("u64"), &Token::U32(1)).unwrap_err();
        assert_eq!(
            err,
            AbiError::Codec {
                type_name: "u64".to_string(),
                message: "cannot encode a U32 value".to_string()
            }
        );

        let err = CanonicalCodec
            .encode(&ty("str[4]"), &Token::from("abc"))
            .unwrap_err();
        assert_eq!(err.kind(), "Codec");

        let err = CanonicalCodec
            .encode(&ty("[u8; 2]"), &Token::Array(vec![Token::U8(1)]))
            .unwrap_err();
        assert_eq!(err.kind(), "Codec");
    }

    #[test]
    fn test_decode_rejects_truncated_and_trailing() {
        let codec = CanonicalCodec;
        assert!(codec.decode(&ty("u64"), &[1, 2, 3]).is_err());
        assert!(codec.decode(&ty("u8"), &[1, 2]).is_err());
        assert!(codec.decode(&ty("bool"), &[2]).is_err());
        assert!(codec.decode(&ty("Option<u8>"), &[3, 0]).is_err());
        assert!(codec.decode(&ty("String"), &[5, b'a']).is_err());
    }

    #[test]
    fn test_decode_nested_value() {
        let codec = CanonicalCodec;
        let param_type = ty("struct Order { id: u64, tags: Vec<str[2]>, memo: Option<String> }");
        let token = Token::Struct(vec![
            Token::U64(77),
            Token::Vector(vec![
                Token::StringArray("ab".to_string()),
                Token::StringArray("cd".to_string()),
            ]),
            Token::from(Some("hi")),
        ]);

        let bytes = codec.encode(&param_type, &token).unwrap();
        assert_eq!(codec.decode(&param_type, &bytes).unwrap(), token);
    }

    #[test]
    fn test_uleb128_lengths() {
        let codec = CanonicalCodec;
        let bytes = codec
            .encode(&ty("Bytes"), &Token::Bytes(vec![0u8; 300]))
            .unwrap();
        // 300 = 0b1_0010_1100 -> 0xac 0x02
        assert_eq!(&bytes[..2], &[0xac, 0x02]);
        assert_eq!(bytes.len(), 302);
    }

    #[derive(Serialize)]
    struct Mirror {
        amount: u64,
        flag: bool,
        name: String,
        weights: Vec<u16>,
        limit: Option<u32>,
        owner: Address,
        pair: (u8, u128),
    }

    #[test]
    fn test_matches_bcs_for_shared_subset() {
        let owner = Address::new([0x42; 32]);
        let mirror = Mirror {
            amount: 123_456,
            flag: true,
            name: "canonical".to_string(),
            weights: vec![1, 2, 300],
            limit: Some(9),
            owner,
            pair: (3, u128::MAX),
        };
        let expected = bcs::to_bytes(&mirror).unwrap();

        let param_type = ty("struct Mirror { amount: u64, flag: bool, name: String, weights: Vec<u16>, limit: Option<u32>, owner: Address, pair: (u8, u128) }");
        let token = Token::Struct(vec![
            Token::U64(123_456),
            Token::Bool(true),
            Token::from("canonical"),
            Token::Vector(vec![Token::U16(1), Token::U16(2), Token::U16(300)]),
            Token::from(Some(9u32)),
            Token::Address(owner),
            Token::Tuple(vec![Token::U8(3), Token::U128(u128::MAX)]),
        ]);

        assert_eq!(CanonicalCodec.encode(&param_type, &token).unwrap(), expected);
    }
}
