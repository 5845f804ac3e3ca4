//! ABI Interface
//!
//! Parsing and indexing of ABI documents for the abi-call workspace.
//!
//! An ABI document lists a program's callable functions (name, ordered inputs,
//! output type) and its configurable constants (name, type, byte offset into the
//! compiled bytecode). This crate turns such a document into a read-only
//! [`InterfaceDescriptor`] that the call layer consults for argument order,
//! declared types and patch locations.
//!
//! # Example
//!
//! ```
//! use abi_interface::InterfaceDescriptor;
//!
//! let descriptor = InterfaceDescriptor::from_json(r#"{
//!     "functions": [
//!         { "name": "transfer",
//!           "inputs": [ {"name": "to", "type": "Address"}, {"name": "amount", "type": "u64"} ],
//!           "output": "()" }
//!     ],
//!     "configurables": [ { "name": "fee", "type": "u64", "offset": 40 } ]
//! }"#).unwrap();
//!
//! let transfer = descriptor.get_function("transfer").unwrap();
//! assert_eq!(transfer.params.len(), 2);
//! assert_eq!(descriptor.get_configurable("fee").unwrap().width, 8);
//! ```

pub mod descriptor;
pub mod param_type;
pub mod program_abi;

// Re-export main types
pub use descriptor::{ConfigurableSlot, FunctionFragment, InterfaceDescriptor, ParamSpec};
pub use param_type::ParamType;
pub use program_abi::{AbiConfigurable, AbiFunction, AbiInput, ProgramAbi};
