//! Decoding call outcomes out of receipts.

use abi_call_types::{AbiError, AbiResult, Bytes32, Receipt, ScriptSegment};
use abi_interface::ParamType;
use tracing::warn;

use crate::codec::{AbiCodec, Token};

/// Outcome of a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResponse {
    /// Decoded return value
    pub value: Token,
    pub receipts: Vec<Receipt>,
    pub gas_used: u64,
    /// Set for submitted transactions, `None` for simulations
    pub tx_id: Option<Bytes32>,
}

/// Outcome of a multi-call, one value per call in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiCallResponse {
    pub values: Vec<Token>,
    pub receipts: Vec<Receipt>,
    pub gas_used: u64,
    pub tx_id: Option<Bytes32>,
}

/// Fail with `Reverted` on the first revert receipt.
pub(crate) fn check_reverts(receipts: &[Receipt]) -> AbiResult<()> {
    for receipt in receipts {
        if let Receipt::Revert { id, reason } = receipt {
            warn!(contract = %id, reason, "call reverted");
            return Err(AbiError::Reverted {
                contract_id: *id,
                reason: *reason,
            });
        }
    }
    Ok(())
}

/// Raw return bytes of each call, in segment order.
///
/// Each segment takes the next `ReturnData` receipt emitted by its own
/// contract, so calls to the same contract are matched in call order.
pub(crate) fn return_data<'r>(
    segments: &[ScriptSegment],
    receipts: &'r [Receipt],
) -> AbiResult<Vec<&'r [u8]>> {
    check_reverts(receipts)?;

    let mut cursor = 0;
    let mut slices = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        let found = receipts[cursor..].iter().enumerate().find_map(|(pos, r)| match r {
            Receipt::ReturnData { id, data } if *id == segment.contract_id => Some((pos, data)),
            _ => None,
        });

        let (pos, data) = found.ok_or_else(|| {
            AbiError::codec(
                "return data",
                format!(
                    "no return data for call {} ('{}') to {}",
                    index, segment.function, segment.contract_id
                ),
            )
        })?;
        cursor += pos + 1;
        slices.push(data.as_slice());
    }

    Ok(slices)
}

/// Decode one return value per segment against `outputs`.
pub(crate) fn decode_values(
    segments: &[ScriptSegment],
    outputs: &[(&ParamType, &dyn AbiCodec)],
    receipts: &[Receipt],
) -> AbiResult<Vec<Token>> {
    let data = return_data(segments, receipts)?;
    outputs
        .iter()
        .zip(data)
        .map(|((output, codec), bytes)| codec.decode(output, bytes))
        .collect()
}
