//! Shared types for the abi-call workspace.
//!
//! This crate provides foundational types used across multiple crates in the workspace,
//! breaking circular dependency chains between the interface, transport and core crates.
//!
//! ## Modules
//!
//! - [`address`]: 32-byte identities (`Address`, `ContractId`, `AssetId`, `Bytes32`) and `ChainId`
//! - [`encoding`]: hex/base64 helpers and serde adapters for byte buffers
//! - [`env_utils`]: typed environment variable parsing
//! - [`error`]: the [`AbiError`] taxonomy shared by every component
//! - [`policies`]: transaction policies and per-call parameters
//! - [`segment`]: binary layout of one call inside script data
//! - [`transaction`]: transaction request, receipts and responses

pub mod address;
pub mod encoding;
pub mod env_utils;
pub mod error;
pub mod policies;
pub mod segment;
pub mod transaction;

pub use address::{Address, AssetId, Bytes32, ChainId, ContractId};
pub use error::{AbiError, AbiResult};
pub use policies::{CallParameters, TxPolicies};
pub use segment::{function_selector, CallSegment, SEGMENT_HEADER_LEN};
pub use transaction::{
    CallResult, Receipt, ScriptSegment, TransactionInput, TransactionOutput, TransactionRequest,
    TransactionResponse, TransactionStatus,
};
