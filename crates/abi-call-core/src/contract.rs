//! Contract handle.
//!
//! Functions are looked up by name when an invocation is requested; the handle
//! itself never changes shape.

use std::sync::Arc;

use abi_call_types::{AbiResult, Bytes32, ContractId};
use abi_interface::InterfaceDescriptor;
use abi_transport::{NoopProvider, Provider};

use crate::call::InvocationScope;
use crate::codec::{AbiCodec, CanonicalCodec};
use crate::configurables::Bytecode;
use crate::resolver::ArgumentInput;
use crate::root::derive_contract_id;

#[derive(Clone)]
pub struct Contract {
    id: ContractId,
    descriptor: Arc<InterfaceDescriptor>,
    codec: Arc<dyn AbiCodec>,
    provider: Arc<dyn Provider>,
}

impl std::fmt::Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("id", &self.id)
            .field("functions", &self.descriptor.functions().count())
            .finish_non_exhaustive()
    }
}

impl Contract {
    /// A handle with the canonical codec and no provider attached.
    pub fn new(id: ContractId, descriptor: Arc<InterfaceDescriptor>) -> Self {
        Self {
            id,
            descriptor,
            codec: Arc::new(CanonicalCodec),
            provider: Arc::new(NoopProvider::default()),
        }
    }

    /// Handle for `bytecode` deployed with `salt`.
    pub fn from_bytecode(
        bytecode: &Bytecode,
        salt: &Bytes32,
        descriptor: Arc<InterfaceDescriptor>,
    ) -> Self {
        Self::new(derive_contract_id(bytecode.as_bytes(), salt), descriptor)
    }

    pub fn with_codec(mut self, codec: Arc<dyn AbiCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn descriptor(&self) -> &Arc<InterfaceDescriptor> {
        &self.descriptor
    }

    /// Build an invocation of `name` with `args`.
    pub fn method(&self, name: &str, args: ArgumentInput) -> AbiResult<InvocationScope> {
        let fragment = self.descriptor.get_function(name)?;
        InvocationScope::new(
            self.id,
            fragment,
            args,
            self.codec.clone(),
            self.provider.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Token;
    use abi_call_types::AbiError;

    fn counter() -> Contract {
        let descriptor = InterfaceDescriptor::from_json(
            r#"{ "functions": [
                { "name": "increment", "inputs": [ {"name": "by", "type": "u64"} ], "output": "u64" },
                { "name": "get", "output": "u64" }
            ] }"#,
        )
        .unwrap();
        Contract::new(ContractId::new([0xc0; 32]), Arc::new(descriptor))
    }

    #[test]
    fn test_method_builds_invocation() {
        let call = counter()
            .method("increment", ArgumentInput::positional([5u64]))
            .unwrap();
        assert_eq!(call.contract_id(), ContractId::new([0xc0; 32]));
        assert_eq!(call.fragment().name, "increment");
        assert_eq!(call.arguments().as_slice(), &[Token::U64(5)]);
        assert_eq!(call.encoded_arguments(), &5u64.to_le_bytes());
    }

    #[test]
    fn test_unknown_method() {
        assert_eq!(
            counter().method("decrement", ArgumentInput::none()).unwrap_err(),
            AbiError::UnknownFunction {
                name: "decrement".to_string()
            }
        );
    }

    #[test]
    fn test_from_bytecode_derives_id() {
        let bytecode = Bytecode::new(vec![9u8; 40]);
        let descriptor = counter().descriptor().clone();
        let contract = Contract::from_bytecode(&bytecode, &Bytes32::ZERO, descriptor);
        assert_eq!(
            contract.id(),
            derive_contract_id(bytecode.as_bytes(), &Bytes32::ZERO)
        );
    }
}
