//! Predicate-gated coin inputs.
//!
//! A predicate is bytecode whose root is the owner of the coins it guards. Its
//! address is always derived from the current bytecode, so configuring the
//! predicate changes its address.

use std::sync::Arc;

use abi_call_types::{
    AbiError, AbiResult, Address, AssetId, Bytes32, ChainId, TransactionInput,
};
use abi_interface::descriptor::MAIN_FUNCTION;
use abi_interface::InterfaceDescriptor;

use crate::call_data::encode_arguments;
use crate::codec::{AbiCodec, CanonicalCodec};
use crate::configurables::{Bytecode, ConfigurableValues};
use crate::resolver::{resolve_arguments, ArgumentInput};
use crate::root::derive_root;

#[derive(Clone)]
pub struct Predicate {
    bytecode: Bytecode,
    chain_id: ChainId,
    descriptor: Option<Arc<InterfaceDescriptor>>,
    data: Vec<u8>,
    codec: Arc<dyn AbiCodec>,
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("bytecode", &self.bytecode)
            .field("chain_id", &self.chain_id)
            .field("data_len", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl Predicate {
    pub fn from_bytecode(bytecode: impl Into<Bytecode>, chain_id: ChainId) -> Self {
        Self {
            bytecode: bytecode.into(),
            chain_id,
            descriptor: None,
            data: Vec::new(),
            codec: Arc::new(CanonicalCodec),
        }
    }

    pub fn with_descriptor(mut self, descriptor: Arc<InterfaceDescriptor>) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn AbiCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Patch configurable values into the bytecode in place.
    ///
    /// On error the bytecode is left exactly as it was.
    pub fn configure(&mut self, values: &ConfigurableValues) -> AbiResult<()> {
        match &self.descriptor {
            Some(descriptor) => self.bytecode.apply(values, descriptor, self.codec.as_ref()),
            None if values.is_empty() => Ok(()),
            None => Err(AbiError::NoConfigurables {
                provided: values.len(),
            }),
        }
    }

    pub fn with_configurables(mut self, values: &ConfigurableValues) -> AbiResult<Self> {
        self.configure(values)?;
        Ok(self)
    }

    /// Encode the arguments of `main` as predicate data.
    pub fn set_data(&mut self, args: ArgumentInput) -> AbiResult<()> {
        let descriptor = self
            .descriptor
            .as_ref()
            .ok_or_else(|| AbiError::UnknownFunction {
                name: MAIN_FUNCTION.to_string(),
            })?;
        let main = descriptor.get_function(MAIN_FUNCTION)?;
        let arguments = resolve_arguments(&main, args)?;
        self.data = encode_arguments(self.codec.as_ref(), &main, &arguments)?;
        Ok(())
    }

    pub fn with_data(mut self, args: ArgumentInput) -> AbiResult<Self> {
        self.set_data(args)?;
        Ok(self)
    }

    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Owner address of coins guarded by this predicate.
    pub fn address(&self) -> Address {
        derive_root(self.bytecode.as_bytes(), self.chain_id)
    }

    /// Spend a coin of `asset_id` owned by this predicate.
    pub fn to_input(&self, amount: u64, asset_id: AssetId) -> TransactionInput {
        self.to_input_with_utxo(Bytes32::ZERO, amount, asset_id)
    }

    pub fn to_input_with_utxo(
        &self,
        utxo_id: Bytes32,
        amount: u64,
        asset_id: AssetId,
    ) -> TransactionInput {
        TransactionInput::Predicate {
            owner: self.address(),
            amount,
            asset_id,
            utxo_id,
            bytecode: self.bytecode.as_bytes().to_vec(),
            predicate_data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Token;

    const SIGNER_ABI: &str = r#"{
        "functions": [
            { "name": "main",
              "inputs": [ {"name": "signature", "type": "b256"}, {"name": "nonce", "type": "u32"} ],
              "output": "bool" }
        ],
        "configurables": [
            { "name": "SIGNER", "type": "Address", "offset": 16 },
            { "name": "THRESHOLD", "type": "u64", "offset": 48 }
        ]
    }"#;

    fn predicate() -> Predicate {
        Predicate::from_bytecode(vec![0x11u8; 64], ChainId::new(3))
            .with_descriptor(Arc::new(InterfaceDescriptor::from_json(SIGNER_ABI).unwrap()))
    }

    #[test]
    fn test_address_tracks_configuration() {
        let mut predicate = predicate();
        let before = predicate.address();
        assert_eq!(before, predicate.address());

        predicate
            .configure(&ConfigurableValues::new().with("THRESHOLD", 2u64))
            .unwrap();
        let after = predicate.address();
        assert_ne!(before, after);
        assert_eq!(after, derive_root(predicate.bytecode().as_bytes(), ChainId::new(3)));
    }

    #[test]
    fn test_failed_configure_leaves_bytecode_untouched() {
        let mut predicate = predicate();
        let before = predicate.bytecode().clone();

        let err = predicate
            .configure(
                &ConfigurableValues::new()
                    .with("THRESHOLD", 2u64)
                    .with("OWNER", Address::ZERO),
            )
            .unwrap_err();
        assert_eq!(
            err,
            AbiError::UnknownConfigurable {
                name: "OWNER".to_string()
            }
        );
        assert_eq!(predicate.bytecode(), &before);
    }

    #[test]
    fn test_configure_without_descriptor() {
        let mut bare = Predicate::from_bytecode(vec![0u8; 8], ChainId::new(3));
        assert!(bare.configure(&ConfigurableValues::new()).is_ok());
        assert_eq!(
            bare.configure(&ConfigurableValues::new().with("x", 1u8)),
            Err(AbiError::NoConfigurables { provided: 1 })
        );
        assert!(matches!(
            bare.set_data(ArgumentInput::none()),
            Err(AbiError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_data_and_input() {
        let signature = Bytes32::new([0x5a; 32]);
        let predicate = predicate()
            .with_data(ArgumentInput::named([
                ("nonce", Token::U32(7)),
                ("signature", Token::B256(signature)),
            ]))
            .unwrap();

        let mut expected = signature.into_bytes().to_vec();
        expected.extend_from_slice(&7u32.to_le_bytes());
        assert_eq!(predicate.data(), expected.as_slice());

        let asset = AssetId::new([1u8; 32]);
        match predicate.to_input(1_000, asset) {
            TransactionInput::Predicate {
                owner,
                amount,
                asset_id,
                bytecode,
                predicate_data,
                ..
            } => {
                assert_eq!(owner, predicate.address());
                assert_eq!((amount, asset_id), (1_000, asset));
                assert_eq!(bytecode, vec![0x11u8; 64]);
                assert_eq!(predicate_data, expected);
            }
            other => panic!("expected predicate input, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_id_changes_address() {
        let a = Predicate::from_bytecode(vec![1u8; 24], ChainId::new(1));
        let b = Predicate::from_bytecode(vec![1u8; 24], ChainId::new(2));
        assert_ne!(a.address(), b.address());
    }
}
