//! Interface Descriptor: a validated, indexed view of an ABI document.
//!
//! Built once from a [`ProgramAbi`] and read-only thereafter. Fragments are held
//! behind `Arc` so many concurrent invocations can reference the same fragment
//! without copying it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use abi_call_types::{AbiError, AbiResult};
use tracing::debug;

use crate::param_type::{parse_param_type, ParamType};
use crate::program_abi::ProgramAbi;

/// Attribute marking a function as accepting forwarded assets.
pub const PAYABLE_ATTRIBUTE: &str = "payable";

/// Name of the entry function of scripts and predicates.
pub const MAIN_FUNCTION: &str = "main";

/// The call-data layout this crate encodes. Documents may omit the version.
pub const SUPPORTED_ENCODING_VERSION: &str = "1";

/// A declared function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
}

/// A declared function: ordered parameters and a return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFragment {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub output: ParamType,
    pub attributes: Vec<String>,
}

impl FunctionFragment {
    /// Position of the parameter called `name`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn param_types(&self) -> Vec<&ParamType> {
        self.params.iter().map(|p| &p.param_type).collect()
    }

    pub fn is_payable(&self) -> bool {
        self.attributes.iter().any(|a| a == PAYABLE_ATTRIBUTE)
    }

    /// Canonical signature, e.g. `transfer(Address,u64)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| p.param_type.to_string())
            .collect();
        format!("{}({})", self.name, params.join(","))
    }
}

/// A configurable constant: where in the bytecode it lives and how wide it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurableSlot {
    pub name: String,
    pub param_type: ParamType,
    pub offset: usize,
    /// Encoded width in bytes, derived from `param_type`
    pub width: usize,
}

impl ConfigurableSlot {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.width
    }
}

/// Named functions and configurables of one program.
#[derive(Debug, Clone, Default)]
pub struct InterfaceDescriptor {
    functions: BTreeMap<String, Arc<FunctionFragment>>,
    configurables: BTreeMap<String, ConfigurableSlot>,
}

impl InterfaceDescriptor {
    /// Validate and index an ABI document.
    ///
    /// Fails with `MalformedAbi` on duplicate function, parameter or configurable
    /// names, unrecognized types, missing or negative offsets, configurables
    /// without a fixed encoded width, overlapping configurable ranges, or an
    /// unsupported `encoding_version`.
    pub fn parse(abi: &ProgramAbi) -> AbiResult<Self> {
        if let Some(version) = &abi.encoding_version {
            if version.trim() != SUPPORTED_ENCODING_VERSION {
                return Err(AbiError::malformed(format!(
                    "unsupported encoding version '{}', expected '{}'",
                    version, SUPPORTED_ENCODING_VERSION
                )));
            }
        }

        let mut functions: BTreeMap<String, Arc<FunctionFragment>> = BTreeMap::new();

        for function in &abi.functions {
            if functions.contains_key(&function.name) {
                return Err(AbiError::malformed(format!(
                    "duplicate function '{}'",
                    function.name
                )));
            }

            let mut params: Vec<ParamSpec> = Vec::with_capacity(function.inputs.len());
            for input in &function.inputs {
                if params.iter().any(|p| p.name == input.name) {
                    return Err(AbiError::malformed(format!(
                        "duplicate parameter '{}' in function '{}'",
                        input.name, function.name
                    )));
                }
                let param_type = parse_param_type(&input.type_name).map_err(|e| {
                    in_context(e, &format!("parameter '{}' of '{}'", input.name, function.name))
                })?;
                params.push(ParamSpec {
                    name: input.name.clone(),
                    param_type,
                });
            }

            let output = parse_param_type(&function.output)
                .map_err(|e| in_context(e, &format!("output of '{}'", function.name)))?;

            functions.insert(
                function.name.clone(),
                Arc::new(FunctionFragment {
                    name: function.name.clone(),
                    params,
                    output,
                    attributes: function.attributes.clone(),
                }),
            );
        }

        let mut configurables: BTreeMap<String, ConfigurableSlot> = BTreeMap::new();

        for configurable in &abi.configurables {
            if configurables.contains_key(&configurable.name) {
                return Err(AbiError::malformed(format!(
                    "duplicate configurable '{}'",
                    configurable.name
                )));
            }

            let offset = match configurable.offset {
                None => {
                    return Err(AbiError::malformed(format!(
                        "configurable '{}' has no offset",
                        configurable.name
                    )))
                }
                Some(o) if o < 0 => {
                    return Err(AbiError::malformed(format!(
                        "configurable '{}' has negative offset {}",
                        configurable.name, o
                    )))
                }
                Some(o) => usize::try_from(o).map_err(|_| {
                    AbiError::malformed(format!(
                        "configurable '{}' offset {} does not fit in memory",
                        configurable.name, o
                    ))
                })?,
            };

            let param_type = parse_param_type(&configurable.type_name)
                .map_err(|e| in_context(e, &format!("configurable '{}'", configurable.name)))?;
            let width = param_type.fixed_width().ok_or_else(|| {
                AbiError::malformed(format!(
                    "configurable '{}' has type {} without a fixed encoded width",
                    configurable.name, param_type
                ))
            })?;
            if offset.checked_add(width).is_none() {
                return Err(AbiError::malformed(format!(
                    "configurable '{}' range overflows",
                    configurable.name
                )));
            }

            configurables.insert(
                configurable.name.clone(),
                ConfigurableSlot {
                    name: configurable.name.clone(),
                    param_type,
                    offset,
                    width,
                },
            );
        }

        check_disjoint(&configurables)?;

        debug!(
            functions = functions.len(),
            configurables = configurables.len(),
            "parsed interface descriptor"
        );

        Ok(Self {
            functions,
            configurables,
        })
    }

    /// Parse a JSON ABI document.
    pub fn from_json(json: &str) -> AbiResult<Self> {
        let abi: ProgramAbi = serde_json::from_str(json)
            .map_err(|e| AbiError::malformed(format!("invalid ABI JSON: {}", e)))?;
        Self::parse(&abi)
    }

    /// Read and parse a JSON ABI document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> AbiResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            AbiError::malformed(format!("failed to read ABI {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn get_function(&self, name: &str) -> AbiResult<Arc<FunctionFragment>> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| AbiError::UnknownFunction {
                name: name.to_string(),
            })
    }

    pub fn get_configurable(&self, name: &str) -> AbiResult<&ConfigurableSlot> {
        self.configurables
            .get(name)
            .ok_or_else(|| AbiError::UnknownConfigurable {
                name: name.to_string(),
            })
    }

    /// Functions in name order.
    pub fn functions(&self) -> impl Iterator<Item = &Arc<FunctionFragment>> {
        self.functions.values()
    }

    /// Configurables in name order.
    pub fn configurables(&self) -> impl Iterator<Item = &ConfigurableSlot> {
        self.configurables.values()
    }

    pub fn has_configurables(&self) -> bool {
        !self.configurables.is_empty()
    }
}

fn in_context(err: AbiError, context: &str) -> AbiError {
    match err {
        AbiError::MalformedAbi { reason } => {
            AbiError::malformed(format!("{} in {}", reason, context))
        }
        other => other,
    }
}

/// Overlapping configurable ranges are an authoring defect; reject them up front.
fn check_disjoint(configurables: &BTreeMap<String, ConfigurableSlot>) -> AbiResult<()> {
    let mut slots: Vec<&ConfigurableSlot> =
        configurables.values().filter(|s| s.width > 0).collect();
    slots.sort_by_key(|s| s.offset);

    for pair in slots.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.offset + a.width > b.offset {
            return Err(AbiError::malformed(format!(
                "configurables '{}' [{}..{}) and '{}' [{}..{}) overlap",
                a.name,
                a.offset,
                a.offset + a.width,
                b.name,
                b.offset,
                b.offset + b.width
            )));
        }
    }
    Ok(())
}
