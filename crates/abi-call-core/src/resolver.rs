//! Argument Resolver.
//!
//! The remote engine decodes arguments positionally, so whatever shape the
//! caller used, the output is always in the fragment's declared parameter order.

use std::collections::HashMap;

use abi_call_types::{AbiError, AbiResult};
use abi_interface::FunctionFragment;
use tracing::trace;

use crate::codec::Token;

/// Caller-supplied arguments: either already ordered, or keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentInput {
    Positional(Vec<Token>),
    Named(HashMap<String, Token>),
}

impl ArgumentInput {
    /// No arguments.
    pub fn none() -> Self {
        ArgumentInput::Positional(Vec::new())
    }

    pub fn positional<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        ArgumentInput::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn named<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Token>,
    {
        ArgumentInput::Named(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Vec<Token>> for ArgumentInput {
    fn from(values: Vec<Token>) -> Self {
        ArgumentInput::Positional(values)
    }
}

impl From<HashMap<String, Token>> for ArgumentInput {
    fn from(values: HashMap<String, Token>) -> Self {
        ArgumentInput::Named(values)
    }
}

/// Arguments in declared parameter order. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector(Vec<Token>);

impl ArgumentVector {
    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Token> {
        self.0
    }
}

/// Produce the positional argument sequence for `fragment`.
///
/// Positional input is only checked for arity. Named input is reordered into
/// declared order; an unmatched key fails with `UnknownParameter` (the
/// lexicographically first one, so the error does not depend on map order) and
/// a missing declared parameter fails with `MissingParameter`.
pub fn resolve_arguments(
    fragment: &FunctionFragment,
    args: ArgumentInput,
) -> AbiResult<ArgumentVector> {
    let resolved = match args {
        ArgumentInput::Positional(values) => {
            if values.len() != fragment.params.len() {
                return Err(AbiError::ArityMismatch {
                    function: fragment.name.clone(),
                    expected: fragment.params.len(),
                    got: values.len(),
                });
            }
            values
        }
        ArgumentInput::Named(mut values) => {
            let mut unknown: Vec<&String> = values
                .keys()
                .filter(|k| fragment.param_index(k).is_none())
                .collect();
            unknown.sort();
            if let Some(name) = unknown.first() {
                return Err(AbiError::UnknownParameter {
                    function: fragment.name.clone(),
                    name: (*name).clone(),
                });
            }

            let mut ordered = Vec::with_capacity(fragment.params.len());
            for param in &fragment.params {
                let value =
                    values
                        .remove(&param.name)
                        .ok_or_else(|| AbiError::MissingParameter {
                            function: fragment.name.clone(),
                            name: param.name.clone(),
                        })?;
                ordered.push(value);
            }
            ordered
        }
    };

    for (index, (param, value)) in fragment.params.iter().zip(&resolved).enumerate() {
        trace!(
            function = %fragment.name,
            index,
            param = %param.name,
            kind = value.kind(),
            "resolved argument"
        );
    }

    Ok(ArgumentVector(resolved))
}
