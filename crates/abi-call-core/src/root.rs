//! Root Deriver: content-derived identities for bytecode.
//!
//! Behavior:
//! - Bytecode is split into 16 KiB leaves; the final leaf is zero-padded to a
//!   multiple of 8 bytes.
//! - Leaves hash as `sha256(0x00 || leaf)`, inner nodes as
//!   `sha256(0x01 || left || right)`.
//! - An odd node at any level is promoted to the next level unchanged.
//! - Empty bytecode has the merkle root `sha256("")`.
//!
//! Padding alone does not separate `b` from `b || 0x00`, so both identities
//! also bind the bytecode length. The predicate identity additionally binds
//! the chain id, so the same predicate has a different owner address on every
//! network.

use abi_call_types::{Address, Bytes32, ChainId, ContractId};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Leaf size in bytes.
pub const LEAF_SIZE: usize = 16 * 1024;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;
const PREDICATE_SEPARATION: &[u8] = b"PREDICATE";
const CONTRACT_SEPARATION: &[u8] = b"CONTRACT";

fn finalize(hasher: Sha256) -> Bytes32 {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Bytes32::new(out)
}

fn hash_leaf(chunk: &[u8]) -> Bytes32 {
    let mut h = Sha256::new();
    h.update([LEAF_PREFIX]);
    h.update(chunk);
    let padding = (8 - chunk.len() % 8) % 8;
    h.update(&[0u8; 8][..padding]);
    finalize(h)
}

fn hash_pair(left: &Bytes32, right: &Bytes32) -> Bytes32 {
    let mut h = Sha256::new();
    h.update([NODE_PREFIX]);
    h.update(left.as_bytes());
    h.update(right.as_bytes());
    finalize(h)
}

/// Merkle root over the bytecode's leaves.
pub fn merkle_root(bytecode: &[u8]) -> Bytes32 {
    if bytecode.is_empty() {
        return finalize(Sha256::new());
    }

    let mut nodes: Vec<Bytes32> = bytecode.chunks(LEAF_SIZE).map(hash_leaf).collect();
    let mut len = nodes.len();

    while len > 1 {
        let mut write = 0;
        let mut read = 0;

        while read < len {
            nodes[write] = if read + 1 < len {
                hash_pair(&nodes[read], &nodes[read + 1])
            } else {
                nodes[read]
            };
            write += 1;
            read += 2;
        }

        len = write;
    }

    nodes[0]
}

/// Spending identity of a predicate:
/// `sha256("PREDICATE" || chain_id BE || len BE || merkle_root)`.
///
/// Call this on the final, configured bytecode.
pub fn derive_root(bytecode: &[u8], chain_id: ChainId) -> Address {
    let root = merkle_root(bytecode);
    let mut h = Sha256::new();
    h.update(PREDICATE_SEPARATION);
    h.update(chain_id.to_be_bytes());
    h.update((bytecode.len() as u64).to_be_bytes());
    h.update(root.as_bytes());
    let identity = finalize(h);

    debug!(
        chain_id = %chain_id,
        bytecode_len = bytecode.len(),
        root = %identity,
        "derived predicate root"
    );
    Address::from(identity)
}

/// Contract id for `bytecode` deployed with `salt`:
/// `sha256("CONTRACT" || salt || len BE || merkle_root)`.
pub fn derive_contract_id(bytecode: &[u8], salt: &Bytes32) -> ContractId {
    let root = merkle_root(bytecode);
    let mut h = Sha256::new();
    h.update(CONTRACT_SEPARATION);
    h.update(salt.as_bytes());
    h.update((bytecode.len() as u64).to_be_bytes());
    h.update(root.as_bytes());
    let id = ContractId::new(finalize(h).into_bytes());

    debug!(bytecode_len = bytecode.len(), contract_id = %id, "derived contract id");
    id
}
