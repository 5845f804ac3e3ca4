//! Transaction request, receipt and response types.
//!
//! A [`TransactionRequest`] is what the call layer hands to a transport: script
//! data holding one segment per contract call, the inputs and outputs those
//! calls need, and the transaction policies. The transport answers with
//! [`Receipt`]s, either inside a [`CallResult`] (simulation) or a
//! [`TransactionResponse`] (submission).

use serde::{Deserialize, Serialize};

use crate::address::{Address, AssetId, Bytes32, ContractId};
use crate::encoding::{base64_bytes, hex_selector};
use crate::policies::TxPolicies;

/// Location of one call's data inside [`TransactionRequest::script_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSegment {
    /// Contract the segment calls
    pub contract_id: ContractId,
    /// Function name, kept for diagnostics
    pub function: String,
    #[serde(with = "hex_selector")]
    pub selector: [u8; 8],
    /// Byte offset of the segment within script data
    pub offset: usize,
    /// Segment length in bytes
    pub len: usize,
}

impl ScriptSegment {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionInput {
    /// A contract the script calls into (directly or transitively)
    Contract { contract_id: ContractId },

    /// A coin owned by a signing account
    Coin {
        owner: Address,
        amount: u64,
        asset_id: AssetId,
        utxo_id: Bytes32,
    },

    /// A coin whose spending is gated by predicate bytecode; `owner` must be the
    /// root derived from `bytecode`.
    Predicate {
        owner: Address,
        amount: u64,
        asset_id: AssetId,
        utxo_id: Bytes32,
        #[serde(with = "base64_bytes")]
        bytecode: Vec<u8>,
        #[serde(with = "base64_bytes")]
        predicate_data: Vec<u8>,
    },
}

impl TransactionInput {
    pub fn contract_id(&self) -> Option<ContractId> {
        match self {
            TransactionInput::Contract { contract_id } => Some(*contract_id),
            _ => None,
        }
    }
}

/// Transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionOutput {
    /// State output for the contract input at `input_index`
    Contract { input_index: u16 },

    /// Fixed coin transfer
    Coin {
        to: Address,
        amount: u64,
        asset_id: AssetId,
    },

    /// Unspent remainder of `asset_id`
    Change { to: Address, asset_id: AssetId },

    /// Slot the callee may fill with a transfer at execution time
    Variable,
}

/// A submittable/simulatable transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Concatenated call segments
    #[serde(with = "base64_bytes")]
    pub script_data: Vec<u8>,

    /// One entry per call, in call order
    pub segments: Vec<ScriptSegment>,

    pub inputs: Vec<TransactionInput>,

    pub outputs: Vec<TransactionOutput>,

    pub policies: TxPolicies,
}

impl TransactionRequest {
    /// Raw bytes of the segment at `index`.
    pub fn segment_bytes(&self, index: usize) -> Option<&[u8]> {
        let segment = self.segments.get(index)?;
        self.script_data.get(segment.range())
    }

    /// Contract ids of all contract inputs, in input order.
    pub fn contract_inputs(&self) -> Vec<ContractId> {
        self.inputs
            .iter()
            .filter_map(TransactionInput::contract_id)
            .collect()
    }
}

/// Record emitted by the remote engine while executing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Receipt {
    /// A call into `to` started
    Call {
        to: ContractId,
        amount: u64,
        asset_id: AssetId,
        gas: u64,
    },

    /// `id` returned the encoded value in `data`
    ReturnData {
        id: ContractId,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },

    /// `id` reverted
    Revert { id: ContractId, reason: u64 },

    /// `id` logged `data`
    Log {
        id: ContractId,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },

    /// Final script outcome
    ScriptResult { success: bool, gas_used: u64 },
}

/// Outcome of a simulation (dry run).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallResult {
    pub receipts: Vec<Receipt>,
}

impl CallResult {
    pub fn new(receipts: Vec<Receipt>) -> Self {
        Self { receipts }
    }

    pub fn gas_used(&self) -> u64 {
        gas_used(&self.receipts)
    }
}

/// Transaction execution status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Success,
    Failure { reason: String },
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub tx_id: Bytes32,
    pub status: TransactionStatus,
    pub receipts: Vec<Receipt>,
    #[serde(default)]
    pub block_height: Option<u64>,
}

impl TransactionResponse {
    pub fn gas_used(&self) -> u64 {
        gas_used(&self.receipts)
    }
}

fn gas_used(receipts: &[Receipt]) -> u64 {
    receipts
        .iter()
        .rev()
        .find_map(|r| match r {
            Receipt::ScriptResult { gas_used, .. } => Some(*gas_used),
            _ => None,
        })
        .unwrap_or(0)
}
