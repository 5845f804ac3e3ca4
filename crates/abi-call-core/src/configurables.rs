//! Bytecode Configurator.
//!
//! Writes caller-supplied values for configurable constants into compiled
//! bytecode at the offsets the interface declares. Every value is validated and
//! encoded before the first byte is written, so a failing call never leaves a
//! half-patched buffer behind.

use abi_call_types::{AbiError, AbiResult};
use abi_interface::InterfaceDescriptor;
use tracing::trace;

use crate::codec::{AbiCodec, Token};

/// An owned bytecode buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Bytecode(Vec<u8>);

impl Bytecode {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Patch `values` into this buffer in place.
    ///
    /// On error the buffer is left exactly as it was, so it can be corrected
    /// and retried without keeping a copy.
    pub fn apply(
        &mut self,
        values: &ConfigurableValues,
        descriptor: &InterfaceDescriptor,
        codec: &dyn AbiCodec,
    ) -> AbiResult<()> {
        let patches = plan_patches(self.len(), values, descriptor, codec)?;
        write_patches(&mut self.0, &patches);
        Ok(())
    }

    /// Consume this buffer and return it with `values` patched in.
    pub fn configure(
        self,
        values: &ConfigurableValues,
        descriptor: &InterfaceDescriptor,
        codec: &dyn AbiCodec,
    ) -> AbiResult<Bytecode> {
        apply_configurables(self, values, descriptor, codec)
    }
}

impl std::fmt::Debug for Bytecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bytecode({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Bytecode {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytecode {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Bytecode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Values for configurable constants, keyed by name.
///
/// Setting the same name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurableValues {
    values: Vec<(String, Token)>,
}

impl ConfigurableValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Token>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Token>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A validated write: `bytes` go to `offset..offset + bytes.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPatch {
    pub name: String,
    pub offset: usize,
    pub bytes: Vec<u8>,
}

/// Validate and encode every value without touching the bytecode.
pub fn plan_patches(
    bytecode_len: usize,
    values: &ConfigurableValues,
    descriptor: &InterfaceDescriptor,
    codec: &dyn AbiCodec,
) -> AbiResult<Vec<PlannedPatch>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    if !descriptor.has_configurables() {
        return Err(AbiError::NoConfigurables {
            provided: values.len(),
        });
    }

    let mut patches = Vec::with_capacity(values.len());
    for (name, value) in values.iter() {
        let slot = descriptor.get_configurable(name)?;
        let bytes = codec.encode(&slot.param_type, value)?;
        if bytes.len() != slot.width {
            return Err(AbiError::codec(
                slot.param_type.to_string(),
                format!(
                    "configurable '{}' encoded to {} bytes, slot is {} bytes wide",
                    name,
                    bytes.len(),
                    slot.width
                ),
            ));
        }
        let fits = slot
            .offset
            .checked_add(slot.width)
            .is_some_and(|end| end <= bytecode_len);
        if !fits {
            return Err(AbiError::OffsetOutOfRange {
                name: name.to_string(),
                offset: slot.offset,
                width: slot.width,
                bytecode_len,
            });
        }
        patches.push(PlannedPatch {
            name: name.to_string(),
            offset: slot.offset,
            bytes,
        });
    }
    Ok(patches)
}

/// Write planned patches. Callers must have planned against `bytecode`'s length.
pub(crate) fn write_patches(bytecode: &mut [u8], patches: &[PlannedPatch]) {
    for patch in patches {
        trace!(
            name = %patch.name,
            offset = patch.offset,
            width = patch.bytes.len(),
            "patching configurable"
        );
        bytecode[patch.offset..patch.offset + patch.bytes.len()].copy_from_slice(&patch.bytes);
    }
}

/// Patch configurable values into `bytecode`.
///
/// Consumes the raw buffer and returns the configured one. The buffer is
/// dropped on error; use [`Bytecode::apply`] to keep it. An empty `values` is
/// a no-op.
///
/// # Errors
///
/// - `NoConfigurables` if values are given but the interface declares none
/// - `UnknownConfigurable` for a name the interface does not declare
/// - `OffsetOutOfRange` if a write would run past the end of the bytecode
/// - codec errors for values that do not match the declared type
pub fn apply_configurables(
    bytecode: Bytecode,
    values: &ConfigurableValues,
    descriptor: &InterfaceDescriptor,
    codec: &dyn AbiCodec,
) -> AbiResult<Bytecode> {
    let mut bytecode = bytecode;
    bytecode.apply(values, descriptor, codec)?;
    Ok(bytecode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CanonicalCodec;
    use abi_call_types::Address;

    fn descriptor() -> InterfaceDescriptor {
        InterfaceDescriptor::from_json(
            r#"{ "configurables": [
                { "name": "fee", "type": "u64", "offset": 40 },
                { "name": "owner", "type": "Address", "offset": 0 },
                { "name": "enabled", "type": "bool", "offset": 48 }
            ] }"#,
        )
        .unwrap()
    }

    fn raw() -> Bytecode {
        Bytecode::new((0..64u8).collect())
    }

    #[test]
    fn test_fee_patch_touches_only_its_slot() {
        let original = raw();
        let patched = apply_configurables(
            original.clone(),
            &ConfigurableValues::new().with("fee", 100u64),
            &descriptor(),
            &CanonicalCodec,
        )
        .unwrap();

        assert_eq!(patched.len(), 64);
        assert_eq!(&patched.as_bytes()[..40], &original.as_bytes()[..40]);
        assert_eq!(&patched.as_bytes()[40..48], &100u64.to_le_bytes());
        assert_eq!(&patched.as_bytes()[48..], &original.as_bytes()[48..]);
    }

    #[test]
    fn test_empty_values_are_idempotent() {
        let descriptor = descriptor();
        let values = ConfigurableValues::new()
            .with("fee", 7u64)
            .with("enabled", true);
        let once = apply_configurables(raw(), &values, &descriptor, &CanonicalCodec).unwrap();
        let twice = apply_configurables(
            once.clone(),
            &ConfigurableValues::new(),
            &descriptor,
            &CanonicalCodec,
        )
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_application_order_does_not_matter() {
        let descriptor = descriptor();
        let owner = Address::new([0xee; 32]);
        let forward = ConfigurableValues::new()
            .with("owner", owner)
            .with("fee", 1u64)
            .with("enabled", true);
        let backward = ConfigurableValues::new()
            .with("enabled", true)
            .with("fee", 1u64)
            .with("owner", owner);

        assert_eq!(
            apply_configurables(raw(), &forward, &descriptor, &CanonicalCodec).unwrap(),
            apply_configurables(raw(), &backward, &descriptor, &CanonicalCodec).unwrap()
        );
    }

    #[test]
    fn test_unknown_name_writes_nothing() {
        let descriptor = descriptor();
        // A valid patch listed before the bad one must not be applied either
        let values = ConfigurableValues::new().with("fee", 5u64).with("tax", 1u64);

        let err = plan_patches(64, &values, &descriptor, &CanonicalCodec).unwrap_err();
        assert_eq!(
            err,
            AbiError::UnknownConfigurable {
                name: "tax".to_string()
            }
        );

        let mut bytes = raw().into_inner();
        let before = bytes.clone();
        if let Ok(patches) = plan_patches(bytes.len(), &values, &descriptor, &CanonicalCodec) {
            write_patches(&mut bytes, &patches);
        }
        assert_eq!(bytes, before);
    }

    #[test]
    fn test_no_configurables_declared() {
        let empty = InterfaceDescriptor::from_json("{}").unwrap();
        let err = apply_configurables(
            raw(),
            &ConfigurableValues::new().with("fee", 1u64),
            &empty,
            &CanonicalCodec,
        )
        .unwrap_err();
        assert_eq!(err, AbiError::NoConfigurables { provided: 1 });

        // Nothing to do is still fine
        assert!(apply_configurables(raw(), &ConfigurableValues::new(), &empty, &CanonicalCodec).is_ok());
    }

    #[test]
    fn test_offset_out_of_range() {
        let err = apply_configurables(
            Bytecode::new(vec![0u8; 44]),
            &ConfigurableValues::new().with("fee", 1u64),
            &descriptor(),
            &CanonicalCodec,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AbiError::OffsetOutOfRange {
                name: "fee".to_string(),
                offset: 40,
                width: 8,
                bytecode_len: 44
            }
        );
    }

    #[test]
    fn test_codec_error_passes_through() {
        let err = apply_configurables(
            raw(),
            &ConfigurableValues::new().with("fee", 1u32),
            &descriptor(),
            &CanonicalCodec,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AbiError::Codec {
                type_name: "u64".to_string(),
                message: "cannot encode a U32 value".to_string()
            }
        );
    }

    #[test]
    fn test_failed_apply_keeps_buffer_for_retry() {
        let descriptor = descriptor();
        let mut bytecode = Bytecode::new(vec![0u8; 44]);
        let owner = ConfigurableValues::new().with("owner", Address::new([1u8; 32]));

        // owner fits, fee at 40..48 does not
        let err = bytecode
            .apply(&owner.clone().with("fee", 1u64), &descriptor, &CanonicalCodec)
            .unwrap_err();
        assert_eq!(err.kind(), "OffsetOutOfRange");
        assert_eq!(bytecode.as_bytes(), &[0u8; 44]);

        bytecode.apply(&owner, &descriptor, &CanonicalCodec).unwrap();
        assert_eq!(&bytecode.as_bytes()[..32], &[1u8; 32]);
        assert_eq!(&bytecode.as_bytes()[32..], &[0u8; 12]);
    }

    #[test]
    fn test_last_value_wins() {
        let values = ConfigurableValues::new().with("fee", 1u64).with("fee", 2u64);
        assert_eq!(values.len(), 1);
        let patched = raw().configure(&values, &descriptor(), &CanonicalCodec).unwrap();
        assert_eq!(&patched.as_bytes()[40..48], &2u64.to_le_bytes());
    }
}
