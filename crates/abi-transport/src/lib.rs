//! Transport boundary for the abi-call workspace.
//!
//! The call layer never talks to a node directly; it hands a
//! [`TransactionRequest`](abi_call_types::TransactionRequest) to a [`Provider`]
//! and decodes whatever receipts come back.
//!
//! - [`provider`]: the async [`Provider`] trait and [`NoopProvider`]
//! - [`mock`]: [`MockProvider`], an in-memory engine for tests and local runs
//! - [`network`]: named networks and their chain ids

pub mod mock;
pub mod network;
pub mod provider;

pub use mock::{CallHandler, MockProvider};
pub use network::{NetworkConfig, DEVNET, LOCAL, MAINNET, TESTNET};
pub use provider::{NoopProvider, Provider};
