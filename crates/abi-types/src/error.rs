//! Error taxonomy for interface parsing, argument resolution, bytecode
//! configuration and call batching.
//!
//! Every variant names the offending function, parameter or configurable so a
//! caller can tell exactly what went wrong without parsing message strings.
//! None of these are retried internally: the operations that raise them are
//! deterministic.

use crate::address::ContractId;

/// Structured error kinds surfaced by the call-encoding layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// The ABI document could not be turned into an interface descriptor.
    MalformedAbi {
        /// What was wrong with the document
        reason: String,
    },

    /// No function with this name is declared.
    UnknownFunction { name: String },

    /// No configurable constant with this name is declared.
    UnknownConfigurable { name: String },

    /// A named argument does not match any declared parameter.
    UnknownParameter {
        /// Function being called
        function: String,
        /// The unmatched argument name
        name: String,
    },

    /// A declared parameter has no value in the named argument mapping.
    MissingParameter {
        /// Function being called
        function: String,
        /// The declared parameter with no value
        name: String,
    },

    /// A positional argument list has the wrong length.
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    /// Configurable values were supplied but the interface declares none.
    NoConfigurables {
        /// Number of values the caller supplied
        provided: usize,
    },

    /// Writing a configurable would run past the end of the bytecode.
    OffsetOutOfRange {
        name: String,
        offset: usize,
        width: usize,
        bytecode_len: usize,
    },

    /// A multi-call was built from zero invocations.
    EmptyBatch,

    /// The codec rejected a value or byte sequence.
    Codec {
        /// Declared type being encoded or decoded
        type_name: String,
        message: String,
    },

    /// A non-zero amount was forwarded to a function that is not payable.
    NonPayable { function: String },

    /// A transaction references more contracts than output indices can address.
    TooManyContracts { count: usize, max: usize },

    /// The remote engine reverted the call.
    Reverted {
        contract_id: ContractId,
        /// Revert code reported by the engine
        reason: u64,
    },
}

/// Result alias for the synchronous encoding/patching operations.
pub type AbiResult<T> = Result<T, AbiError>;

impl AbiError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        AbiError::MalformedAbi {
            reason: reason.into(),
        }
    }

    pub fn codec(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        AbiError::Codec {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind name (e.g. `"UnknownConfigurable"`).
    pub fn kind(&self) -> &'static str {
        match self {
            AbiError::MalformedAbi { .. } => "MalformedAbi",
            AbiError::UnknownFunction { .. } => "UnknownFunction",
            AbiError::UnknownConfigurable { .. } => "UnknownConfigurable",
            AbiError::UnknownParameter { .. } => "UnknownParameter",
            AbiError::MissingParameter { .. } => "MissingParameter",
            AbiError::ArityMismatch { .. } => "ArityMismatch",
            AbiError::NoConfigurables { .. } => "NoConfigurables",
            AbiError::OffsetOutOfRange { .. } => "OffsetOutOfRange",
            AbiError::EmptyBatch => "EmptyBatch",
            AbiError::Codec { .. } => "Codec",
            AbiError::NonPayable { .. } => "NonPayable",
            AbiError::TooManyContracts { .. } => "TooManyContracts",
            AbiError::Reverted { .. } => "Reverted",
        }
    }
}

impl std::fmt::Display for AbiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbiError::MalformedAbi { reason } => write!(f, "MalformedAbi: {}", reason),
            AbiError::UnknownFunction { name } => {
                write!(f, "UnknownFunction: no function named '{}'", name)
            }
            AbiError::UnknownConfigurable { name } => {
                write!(f, "UnknownConfigurable: no configurable named '{}'", name)
            }
            AbiError::UnknownParameter { function, name } => write!(
                f,
                "UnknownParameter: '{}' is not a parameter of {}",
                name, function
            ),
            AbiError::MissingParameter { function, name } => write!(
                f,
                "MissingParameter: no value for parameter '{}' of {}",
                name, function
            ),
            AbiError::ArityMismatch {
                function,
                expected,
                got,
            } => write!(
                f,
                "ArityMismatch: {} expects {} argument(s), got {}",
                function, expected, got
            ),
            AbiError::NoConfigurables { provided } => write!(
                f,
                "NoConfigurables: {} value(s) supplied but the interface declares no configurables",
                provided
            ),
            AbiError::OffsetOutOfRange {
                name,
                offset,
                width,
                bytecode_len,
            } => write!(
                f,
                "OffsetOutOfRange: configurable '{}' at offset {} with width {} exceeds bytecode length {}",
                name, offset, width, bytecode_len
            ),
            AbiError::EmptyBatch => write!(f, "EmptyBatch: a multi-call needs at least one call"),
            AbiError::Codec { type_name, message } => {
                write!(f, "Codec error for {}: {}", type_name, message)
            }
            AbiError::NonPayable { function } => write!(
                f,
                "NonPayable: {} does not accept forwarded assets",
                function
            ),
            AbiError::TooManyContracts { count, max } => write!(
                f,
                "TooManyContracts: {} contract inputs, at most {} are addressable",
                count, max
            ),
            AbiError::Reverted {
                contract_id,
                reason,
            } => write!(
                f,
                "Reverted: contract {} reverted with code {}",
                contract_id, reason
            ),
        }
    }
}

impl std::error::Error for AbiError {}
