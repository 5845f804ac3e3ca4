//! Multi-Call Scope: several invocations in one atomic transaction.
//!
//! Calls keep their insertion order in the script. Each call's segment stays
//! independently addressable, so its return value is decoded against its own
//! fragment after execution.

use std::sync::Arc;

use abi_call_types::{AbiError, AbiResult, Receipt, TransactionRequest, TxPolicies};
use abi_interface::ParamType;
use abi_transport::Provider;
use anyhow::Result;
use tracing::debug;

use crate::call::{assemble_request, InvocationScope};
use crate::codec::{AbiCodec, Token};
use crate::response::{decode_values, MultiCallResponse};

#[derive(Clone)]
pub struct MultiCallScope {
    calls: Vec<InvocationScope>,
    tx_policies: TxPolicies,
    provider: Option<Arc<dyn Provider>>,
}

impl std::fmt::Debug for MultiCallScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiCallScope")
            .field("calls", &self.calls)
            .field("tx_policies", &self.tx_policies)
            .finish_non_exhaustive()
    }
}

impl MultiCallScope {
    /// Batch `calls` in order. Fails with `EmptyBatch` if there are none.
    ///
    /// The batch uses the first call's transaction policies and provider
    /// unless overridden.
    pub fn new(calls: Vec<InvocationScope>) -> AbiResult<Self> {
        let first = calls.first().ok_or(AbiError::EmptyBatch)?;
        let tx_policies = *first.tx_policies();
        Ok(Self {
            calls,
            tx_policies,
            provider: None,
        })
    }

    pub fn add_call(mut self, call: InvocationScope) -> Self {
        self.calls.push(call);
        self
    }

    pub fn with_tx_policies(mut self, policies: TxPolicies) -> Self {
        self.tx_policies = policies;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn calls(&self) -> &[InvocationScope] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn to_transaction_request(&self) -> AbiResult<TransactionRequest> {
        let calls: Vec<&InvocationScope> = self.calls.iter().collect();
        assemble_request(&calls, self.tx_policies)
    }

    /// Submit the batch and decode every call's return value.
    pub async fn call(&self) -> Result<MultiCallResponse> {
        let request = self.to_transaction_request()?;
        debug!(calls = self.calls.len(), "submitting multi-call");
        let response = self.provider().submit(&request).await?;
        let values = self.decode(&request, &response.receipts)?;
        Ok(MultiCallResponse {
            values,
            gas_used: response.gas_used(),
            receipts: response.receipts,
            tx_id: Some(response.tx_id),
        })
    }

    /// Dry-run the batch and decode every call's return value.
    pub async fn simulate(&self) -> Result<MultiCallResponse> {
        let request = self.to_transaction_request()?;
        debug!(calls = self.calls.len(), "simulating multi-call");
        let result = self.provider().simulate(&request).await?;
        let values = self.decode(&request, &result.receipts)?;
        Ok(MultiCallResponse {
            values,
            gas_used: result.gas_used(),
            receipts: result.receipts,
            tx_id: None,
        })
    }

    fn provider(&self) -> &Arc<dyn Provider> {
        match &self.provider {
            Some(provider) => provider,
            // new() guarantees at least one call
            None => self.calls[0].provider(),
        }
    }

    fn decode(&self, request: &TransactionRequest, receipts: &[Receipt]) -> AbiResult<Vec<Token>> {
        let outputs: Vec<(&ParamType, &dyn AbiCodec)> = self
            .calls
            .iter()
            .map(|c| (&c.fragment().output, c.codec().as_ref()))
            .collect();
        decode_values(&request.segments, &outputs, receipts)
    }
}
