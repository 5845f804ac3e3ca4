//! ABI Call
//!
//! ABI-driven call encoding for contract platforms:
//!
//! - **Interface descriptors**: parse ABI documents into functions and configurable slots
//! - **Argument resolution**: named or positional arguments in declared order
//! - **Bytecode configuration**: patch configurable constants at declared offsets
//! - **Root derivation**: predicate owner addresses and contract ids from bytecode
//! - **Invocations**: single calls and atomic multi-call batches over a [`Provider`](transport::Provider)
//!
//! Most users only need the [`prelude`].
//!
//! ```
//! use std::sync::Arc;
//! use abi_call::prelude::*;
//!
//! let descriptor = InterfaceDescriptor::from_json(r#"{
//!     "functions": [ { "name": "transfer",
//!         "inputs": [ {"name": "to", "type": "Address"}, {"name": "amount", "type": "u64"} ] } ]
//! }"#).unwrap();
//!
//! let token = Contract::new(ContractId::new([1u8; 32]), Arc::new(descriptor));
//! let call = token
//!     .method("transfer", ArgumentInput::named([
//!         ("amount", Token::U64(500)),
//!         ("to", Token::Address(Address::ZERO)),
//!     ]))
//!     .unwrap();
//!
//! assert_eq!(call.arguments().as_slice()[1], Token::U64(500));
//! assert_eq!(call.to_transaction_request().unwrap().segments.len(), 1);
//! ```

pub use abi_call_core as core;
pub use abi_call_types as types;
pub use abi_interface as interface;
pub use abi_transport as transport;

pub mod prelude {
    pub use abi_call_core::{
        apply_configurables, derive_contract_id, derive_root, AbiCodec, ArgumentInput, Bytecode,
        CallResponse, CanonicalCodec, ConfigurableValues, Contract, InvocationScope,
        MultiCallResponse, MultiCallScope, Predicate, Token,
    };
    pub use abi_call_types::{
        AbiError, AbiResult, Address, AssetId, Bytes32, CallParameters, ChainId, ContractId,
        Receipt, TransactionInput, TransactionOutput, TransactionRequest, TxPolicies,
    };
    pub use abi_interface::{InterfaceDescriptor, ParamType};
    pub use abi_transport::{MockProvider, NetworkConfig, NoopProvider, Provider};
}
