//! Binary layout of one call inside script data.
//!
//! ```text
//! contract_id (32) | selector (8) | amount u64 LE | asset_id (32) | gas_forwarded u64 LE | args_len u64 LE | args
//! ```
//!
//! `gas_forwarded == 0` means "forward all remaining gas".

use sha2::{Digest, Sha256};

use crate::address::{AssetId, ContractId};

/// Bytes preceding the encoded arguments.
pub const SEGMENT_HEADER_LEN: usize = 32 + 8 + 8 + 32 + 8 + 8;

/// First 8 bytes of `sha256(signature)`, e.g. for `transfer(Address,u64)`.
pub fn function_selector(signature: &str) -> [u8; 8] {
    let digest = Sha256::digest(signature.as_bytes());
    let mut selector = [0u8; 8];
    selector.copy_from_slice(&digest[..8]);
    selector
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSegment {
    pub contract_id: ContractId,
    pub selector: [u8; 8],
    pub amount: u64,
    pub asset_id: AssetId,
    pub gas_forwarded: u64,
    pub args: Vec<u8>,
}

impl CallSegment {
    pub fn encoded_len(&self) -> usize {
        SEGMENT_HEADER_LEN + self.args.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(self.contract_id.as_bytes());
        out.extend_from_slice(&self.selector);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(self.asset_id.as_bytes());
        out.extend_from_slice(&self.gas_forwarded.to_le_bytes());
        out.extend_from_slice(&(self.args.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.args);
        out
    }

    /// Decode a segment. The input must be exactly one segment long.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let mut reader = Reader { bytes, pos: 0 };

        let contract_id = ContractId::new(reader.array::<32>()?);
        let selector = reader.array::<8>()?;
        let amount = u64::from_le_bytes(reader.array::<8>()?);
        let asset_id = AssetId::new(reader.array::<32>()?);
        let gas_forwarded = u64::from_le_bytes(reader.array::<8>()?);
        let args_len = usize::try_from(u64::from_le_bytes(reader.array::<8>()?)).ok()?;
        let args = reader.take(args_len)?.to_vec();

        if reader.pos != bytes.len() {
            return None;
        }

        Some(Self {
            contract_id,
            selector,
            amount,
            asset_id,
            gas_forwarded,
            args,
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }
}
