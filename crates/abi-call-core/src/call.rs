//! Invocation Scope: one pending contract call.
//!
//! Arguments are resolved and encoded when the scope is built, so a bad argument
//! fails before anything touches the network. The transaction request is
//! materialized on demand and only `call()`/`simulate()` suspend.

use std::collections::HashSet;
use std::sync::Arc;

use abi_call_types::{
    AbiError, AbiResult, CallParameters, ContractId, TransactionInput, TransactionOutput,
    TransactionRequest, TxPolicies,
};
use abi_interface::FunctionFragment;
use abi_transport::Provider;
use anyhow::Result;
use tracing::debug;

use crate::call_data::{build_script, encode_arguments, selector, EncodedCall};
use crate::codec::AbiCodec;
use crate::resolver::{resolve_arguments, ArgumentInput, ArgumentVector};
use crate::response::{decode_values, CallResponse};

#[derive(Clone)]
pub struct InvocationScope {
    fragment: Arc<FunctionFragment>,
    arguments: ArgumentVector,
    encoded: EncodedCall,
    tx_policies: TxPolicies,
    external_contracts: Vec<ContractId>,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    variable_outputs: usize,
    codec: Arc<dyn AbiCodec>,
    provider: Arc<dyn Provider>,
}

impl std::fmt::Debug for InvocationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationScope")
            .field("contract_id", &self.encoded.contract_id)
            .field("function", &self.fragment.name)
            .field("arguments", &self.arguments)
            .field("call_parameters", &self.encoded.call_parameters)
            .finish_non_exhaustive()
    }
}

impl InvocationScope {
    /// Resolve `args` against `fragment` and encode them for `contract_id`.
    pub fn new(
        contract_id: ContractId,
        fragment: Arc<FunctionFragment>,
        args: ArgumentInput,
        codec: Arc<dyn AbiCodec>,
        provider: Arc<dyn Provider>,
    ) -> AbiResult<Self> {
        let arguments = resolve_arguments(&fragment, args)?;
        let encoded_args = encode_arguments(codec.as_ref(), &fragment, &arguments)?;
        let encoded = EncodedCall {
            contract_id,
            function: fragment.name.clone(),
            selector: selector(&fragment),
            encoded_args,
            call_parameters: CallParameters::default(),
        };

        Ok(Self {
            fragment,
            arguments,
            encoded,
            tx_policies: TxPolicies::default(),
            external_contracts: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            variable_outputs: 0,
            codec,
            provider,
        })
    }

    /// Forward assets with the call. A non-zero amount requires a payable function.
    pub fn with_call_parameters(mut self, params: CallParameters) -> AbiResult<Self> {
        if params.amount > 0 && !self.fragment.is_payable() {
            return Err(AbiError::NonPayable {
                function: self.fragment.name.clone(),
            });
        }
        self.encoded.call_parameters = params;
        Ok(self)
    }

    pub fn with_tx_policies(mut self, policies: TxPolicies) -> Self {
        self.tx_policies = policies;
        self
    }

    /// Contracts the callee reaches into besides the target.
    pub fn with_external_contracts(mut self, contracts: impl IntoIterator<Item = ContractId>) -> Self {
        self.external_contracts.extend(contracts);
        self
    }

    /// Extra inputs, e.g. predicate-gated coins.
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = TransactionInput>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = TransactionOutput>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    /// Reserve `count` variable outputs for transfers made by the callee.
    pub fn with_variable_outputs(mut self, count: usize) -> Self {
        self.variable_outputs = count;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn contract_id(&self) -> ContractId {
        self.encoded.contract_id
    }

    pub fn fragment(&self) -> &Arc<FunctionFragment> {
        &self.fragment
    }

    pub fn arguments(&self) -> &ArgumentVector {
        &self.arguments
    }

    pub fn encoded_arguments(&self) -> &[u8] {
        &self.encoded.encoded_args
    }

    pub fn call_parameters(&self) -> &CallParameters {
        &self.encoded.call_parameters
    }

    pub fn tx_policies(&self) -> &TxPolicies {
        &self.tx_policies
    }

    pub(crate) fn encoded_call(&self) -> &EncodedCall {
        &self.encoded
    }

    pub(crate) fn codec(&self) -> &Arc<dyn AbiCodec> {
        &self.codec
    }

    pub(crate) fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Materialize a request for this call alone. Repeated calls yield equal requests.
    pub fn to_transaction_request(&self) -> AbiResult<TransactionRequest> {
        assemble_request(&[self], self.tx_policies)
    }

    /// Submit the call and decode its return value.
    pub async fn call(&self) -> Result<CallResponse> {
        let request = self.to_transaction_request()?;
        debug!(
            contract = %self.contract_id(),
            function = %self.fragment.name,
            "submitting call"
        );
        let response = self.provider.submit(&request).await?;
        let value = self.decode_single(&request, &response.receipts)?;
        Ok(CallResponse {
            value,
            gas_used: response.gas_used(),
            receipts: response.receipts,
            tx_id: Some(response.tx_id),
        })
    }

    /// Dry-run the call and decode its return value.
    pub async fn simulate(&self) -> Result<CallResponse> {
        let request = self.to_transaction_request()?;
        debug!(
            contract = %self.contract_id(),
            function = %self.fragment.name,
            "simulating call"
        );
        let result = self.provider.simulate(&request).await?;
        let value = self.decode_single(&request, &result.receipts)?;
        Ok(CallResponse {
            value,
            gas_used: result.gas_used(),
            receipts: result.receipts,
            tx_id: None,
        })
    }

    fn decode_single(
        &self,
        request: &TransactionRequest,
        receipts: &[abi_call_types::Receipt],
    ) -> AbiResult<crate::codec::Token> {
        let mut values = decode_values(
            &request.segments,
            &[(&self.fragment.output, self.codec.as_ref())],
            receipts,
        )?;
        values
            .pop()
            .ok_or_else(|| AbiError::codec(self.fragment.output.to_string(), "no value decoded"))
    }
}

/// Build one transaction request from `calls`, in call order.
///
/// Contract inputs are deduplicated by id in first-seen order and each gets one
/// contract output. Other inputs and outputs follow in call order with exact
/// duplicates dropped. Variable outputs are summed.
///
/// Fails with `TooManyContracts` when a contract output index would not fit in
/// a `u16`.
pub(crate) fn assemble_request(
    calls: &[&InvocationScope],
    policies: TxPolicies,
) -> AbiResult<TransactionRequest> {
    let (script_data, segments) = build_script(calls.iter().map(|c| c.encoded_call()));

    let mut contracts = ContractSet::default();
    let mut other_inputs: Vec<TransactionInput> = Vec::new();
    let mut extra_outputs: Vec<TransactionOutput> = Vec::new();
    let mut variable_outputs = 0usize;

    for call in calls {
        contracts.insert(call.contract_id());
        for id in &call.external_contracts {
            contracts.insert(*id);
        }
        for input in &call.inputs {
            match input.contract_id() {
                Some(id) => contracts.insert(id),
                None if !other_inputs.contains(input) => other_inputs.push(input.clone()),
                None => {}
            }
        }
        for output in &call.outputs {
            if !extra_outputs.contains(output) {
                extra_outputs.push(output.clone());
            }
        }
        variable_outputs += call.variable_outputs;
    }

    let contracts = contracts.ordered;
    let mut outputs: Vec<TransactionOutput> = (0..contracts.len())
        .map(|i| {
            u16::try_from(i)
                .map(|input_index| TransactionOutput::Contract { input_index })
                .map_err(|_| AbiError::TooManyContracts {
                    count: contracts.len(),
                    max: usize::from(u16::MAX) + 1,
                })
        })
        .collect::<AbiResult<_>>()?;

    let mut inputs: Vec<TransactionInput> = contracts
        .iter()
        .map(|id| TransactionInput::Contract { contract_id: *id })
        .collect();
    inputs.extend(other_inputs);

    outputs.extend(extra_outputs);
    outputs.extend(std::iter::repeat(TransactionOutput::Variable).take(variable_outputs));

    debug!(
        segments = segments.len(),
        inputs = inputs.len(),
        outputs = outputs.len(),
        "materialized transaction request"
    );

    Ok(TransactionRequest {
        script_data,
        segments,
        inputs,
        outputs,
        policies,
    })
}

/// Contract ids in first-seen order.
#[derive(Default)]
struct ContractSet {
    seen: HashSet<ContractId>,
    ordered: Vec<ContractId>,
}

impl ContractSet {
    fn insert(&mut self, id: ContractId) {
        if self.seen.insert(id) {
            self.ordered.push(id);
        }
    }
}
