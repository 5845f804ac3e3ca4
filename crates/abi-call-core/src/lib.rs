//! ABI call core.
//!
//! Turns interface descriptors and caller-supplied values into the exact bytes a
//! remote execution engine consumes:
//!
//! - [`codec`]: the [`AbiCodec`] boundary and the default [`CanonicalCodec`]
//! - [`resolver`]: named or positional arguments to the declared parameter order
//! - [`configurables`]: patching configurable constants into bytecode
//! - [`root`]: content-derived identities for predicates and contracts
//! - [`predicate`]: predicate-gated coin inputs
//! - [`contract`]: a contract handle producing invocations by function name
//! - [`call`]: a single pending invocation
//! - [`multicall`]: atomic batches of invocations
//! - [`response`]: decoding return values out of receipts
//!
//! Everything except `call()`/`simulate()` is synchronous and pure.

pub mod call;
pub mod call_data;
pub mod codec;
pub mod configurables;
pub mod contract;
pub mod multicall;
pub mod predicate;
pub mod resolver;
pub mod response;
pub mod root;

pub use abi_call_types::{AbiError, AbiResult};

pub use call::InvocationScope;
pub use codec::{AbiCodec, CanonicalCodec, Token};
pub use configurables::{apply_configurables, Bytecode, ConfigurableValues};
pub use contract::Contract;
pub use multicall::MultiCallScope;
pub use predicate::Predicate;
pub use resolver::{resolve_arguments, ArgumentInput, ArgumentVector};
pub use response::{CallResponse, MultiCallResponse};
pub use root::{derive_contract_id, derive_root, merkle_root};
