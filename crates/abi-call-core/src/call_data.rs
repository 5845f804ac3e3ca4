//! Call data: selectors, encoded arguments and script layout.

use abi_call_types::{
    function_selector, AbiResult, CallParameters, CallSegment, ContractId, ScriptSegment,
};
use abi_interface::FunctionFragment;

use crate::codec::AbiCodec;
use crate::resolver::ArgumentVector;

/// Selector of `fragment`: first 8 bytes of `sha256(signature)`.
pub fn selector(fragment: &FunctionFragment) -> [u8; 8] {
    function_selector(&fragment.signature())
}

/// Encode resolved arguments back to back, each against its declared type.
pub fn encode_arguments(
    codec: &dyn AbiCodec,
    fragment: &FunctionFragment,
    args: &ArgumentVector,
) -> AbiResult<Vec<u8>> {
    codec.encode_all(&fragment.param_types(), args.as_slice())
}

/// One fully encoded call, ready to be laid into script data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub contract_id: ContractId,
    pub function: String,
    pub selector: [u8; 8],
    pub encoded_args: Vec<u8>,
    pub call_parameters: CallParameters,
}

impl EncodedCall {
    pub fn to_segment(&self) -> CallSegment {
        CallSegment {
            contract_id: self.contract_id,
            selector: self.selector,
            amount: self.call_parameters.amount,
            asset_id: self.call_parameters.asset_id,
            gas_forwarded: self.call_parameters.gas_forwarded.unwrap_or(0),
            args: self.encoded_args.clone(),
        }
    }
}

/// Concatenate calls into script data, recording where each one lives.
pub fn build_script<'a, I>(calls: I) -> (Vec<u8>, Vec<ScriptSegment>)
where
    I: IntoIterator<Item = &'a EncodedCall>,
{
    let mut script_data = Vec::new();
    let mut segments = Vec::new();

    for call in calls {
        let bytes = call.to_segment().encode();
        segments.push(ScriptSegment {
            contract_id: call.contract_id,
            function: call.function.clone(),
            selector: call.selector,
            offset: script_data.len(),
            len: bytes.len(),
        });
        script_data.extend_from_slice(&bytes);
    }

    (script_data, segments)
}
