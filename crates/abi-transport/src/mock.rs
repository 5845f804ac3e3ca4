//! In-memory transaction engine for tests.
//!
//! [`MockProvider`] executes each call segment of a request against handlers
//! registered per `(contract id, selector)` and emits the same receipt stream a
//! node would: `Call`, then `ReturnData` or `Revert`, then a final
//! `ScriptResult`.
//!
//! # Example
//!
//! ```
//! use abi_call_types::ContractId;
//! use abi_transport::MockProvider;
//!
//! let token = ContractId::new([1u8; 32]);
//! let mut provider = MockProvider::new(abi_transport::LOCAL.chain_id);
//! provider.on_function(token, "total_supply()", |_call| Ok(1_000u64.to_le_bytes().to_vec()));
//! provider.on_function(token, "burn(u64)", |_call| Err(42));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::debug;

use abi_call_types::{
    function_selector, Bytes32, CallResult, CallSegment, ChainId, ContractId, Receipt,
    TransactionRequest, TransactionResponse, TransactionStatus,
};

use crate::provider::Provider;

/// Handles one call: returns the encoded return value, or a revert code.
pub type CallHandler = Arc<dyn Fn(&CallSegment) -> std::result::Result<Vec<u8>, u64> + Send + Sync>;

/// Revert code for calls no handler is registered for.
pub const UNKNOWN_SELECTOR_REVERT: u64 = 0xffff_ffff_ffff_0000;

const SCRIPT_BASE_GAS: u64 = 100;
const CALL_BASE_GAS: u64 = 250;
const GAS_PER_ARG_BYTE: u64 = 4;

#[derive(Clone)]
pub struct MockProvider {
    chain_id: ChainId,
    network: String,
    handlers: HashMap<(ContractId, [u8; 8]), CallHandler>,
    /// If set, all provider calls return this error
    force_error: Option<String>,
    submitted: Arc<Mutex<Vec<TransactionRequest>>>,
    simulated: Arc<Mutex<Vec<TransactionRequest>>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("chain_id", &self.chain_id)
            .field("network", &self.network)
            .field("handlers", &self.handlers.len())
            .field("force_error", &self.force_error)
            .finish()
    }
}

impl MockProvider {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            network: "mock".to_string(),
            handlers: HashMap::new(),
            force_error: None,
            submitted: Arc::new(Mutex::new(Vec::new())),
            simulated: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a handler for calls to `contract_id` with `selector`.
    pub fn on_call<F>(&mut self, contract_id: ContractId, selector: [u8; 8], handler: F) -> &mut Self
    where
        F: Fn(&CallSegment) -> std::result::Result<Vec<u8>, u64> + Send + Sync + 'static,
    {
        self.handlers
            .insert((contract_id, selector), Arc::new(handler));
        self
    }

    /// Register a handler by canonical signature, e.g. `transfer(Address,u64)`.
    pub fn on_function<F>(&mut self, contract_id: ContractId, signature: &str, handler: F) -> &mut Self
    where
        F: Fn(&CallSegment) -> std::result::Result<Vec<u8>, u64> + Send + Sync + 'static,
    {
        self.on_call(contract_id, function_selector(signature), handler)
    }

    /// Force all subsequent calls to return the given error.
    pub fn set_error(&mut self, error: &str) -> &mut Self {
        self.force_error = Some(error.to_string());
        self
    }

    pub fn clear_error(&mut self) -> &mut Self {
        self.force_error = None;
        self
    }

    /// Requests passed to [`Provider::submit`], oldest first.
    pub fn submitted_requests(&self) -> Vec<TransactionRequest> {
        self.submitted.lock().clone()
    }

    /// Requests passed to [`Provider::simulate`], oldest first.
    pub fn simulated_requests(&self) -> Vec<TransactionRequest> {
        self.simulated.lock().clone()
    }

    fn execute(&self, request: &TransactionRequest) -> Result<Vec<Receipt>> {
        if let Some(ref error) = self.force_error {
            return Err(anyhow!("{}", error));
        }

        let contracts: HashSet<ContractId> = request.contract_inputs().into_iter().collect();
        let mut receipts = Vec::new();
        let mut gas_used = SCRIPT_BASE_GAS;

        for (index, segment) in request.segments.iter().enumerate() {
            let bytes = request.segment_bytes(index).ok_or_else(|| {
                anyhow!(
                    "segment {} ('{}') lies outside script data",
                    index,
                    segment.function
                )
            })?;
            let call = CallSegment::decode(bytes).ok_or_else(|| {
                anyhow!("segment {} ('{}') is malformed", index, segment.function)
            })?;
            if call.contract_id != segment.contract_id || call.selector != segment.selector {
                bail!(
                    "segment {} ('{}') header does not match its metadata",
                    index,
                    segment.function
                );
            }
            if !contracts.contains(&call.contract_id) {
                bail!(
                    "contract {} called by segment {} is not a transaction input",
                    call.contract_id,
                    index
                );
            }

            gas_used += CALL_BASE_GAS + GAS_PER_ARG_BYTE * call.args.len() as u64;
            let forwarded = if call.gas_forwarded == 0 {
                request.policies.script_gas_limit
            } else {
                call.gas_forwarded
            };
            receipts.push(Receipt::Call {
                to: call.contract_id,
                amount: call.amount,
                asset_id: call.asset_id,
                gas: forwarded,
            });

            let outcome = match self.handlers.get(&(call.contract_id, call.selector)) {
                Some(handler) => handler(&call),
                None => Err(UNKNOWN_SELECTOR_REVERT),
            };

            match outcome {
                Ok(data) => receipts.push(Receipt::ReturnData {
                    id: call.contract_id,
                    data,
                }),
                Err(reason) => {
                    debug!(
                        contract = %call.contract_id,
                        function = %segment.function,
                        reason,
                        "mock call reverted"
                    );
                    receipts.push(Receipt::Revert {
                        id: call.contract_id,
                        reason,
                    });
                    receipts.push(Receipt::ScriptResult {
                        success: false,
                        gas_used,
                    });
                    return Ok(receipts);
                }
            }
        }

        receipts.push(Receipt::ScriptResult {
            success: true,
            gas_used,
        });
        Ok(receipts)
    }
}

/// Transaction id: hash of the request's JSON form.
fn transaction_id(request: &TransactionRequest) -> Result<Bytes32> {
    let json = serde_json::to_vec(request)?;
    let digest = Sha256::digest(&json);
    let mut id = [0u8; 32];
    id.copy_from_slice(&digest);
    Ok(Bytes32::new(id))
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    async fn submit(&self, request: &TransactionRequest) -> Result<TransactionResponse> {
        let receipts = self.execute(request)?;
        let tx_id = transaction_id(request)?;

        let status = match receipts.iter().find_map(|r| match r {
            Receipt::Revert { id, reason } => Some((*id, *reason)),
            _ => None,
        }) {
            Some((id, reason)) => TransactionStatus::Failure {
                reason: format!("contract {} reverted with {}", id, reason),
            },
            None => TransactionStatus::Success,
        };

        let block_height = {
            let mut submitted = self.submitted.lock();
            submitted.push(request.clone());
            submitted.len() as u64
        };

        Ok(TransactionResponse {
            tx_id,
            status,
            receipts,
            block_height: Some(block_height),
        })
    }

    async fn simulate(&self, request: &TransactionRequest) -> Result<CallResult> {
        let receipts = self.execute(request)?;
        self.simulated.lock().push(request.clone());
        Ok(CallResult::new(receipts))
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn network_name(&self) -> &str {
        &self.network
    }
}
