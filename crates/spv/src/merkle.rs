//! Merkle inclusion proofs of transactions.

use bitcoin::{hashes::Hash, TxMerkleNode, Txid};
use tbtc_bridge_primitives::{codec::split_hashes, hash::sha256d, types::TxMerkleBranch};

use crate::errors::{SpvError, SpvResult};

/// Concatenates the sibling hashes of `branch`, deepest first, in internal byte order.
pub fn create_merkle_proof(branch: &TxMerkleBranch) -> Vec<u8> {
    branch
        .merkle
        .iter()
        .flat_map(|node| node.to_byte_array())
        .collect()
}

/// Checks that `merkle_proof` leads from `tx_hash` at `tx_index` to `merkle_root`.
///
/// At every level the index parity decides the side: an even index puts the running hash on the
/// left of its sibling, an odd index on the right. A block with a single transaction has an empty
/// proof and a root equal to the transaction hash.
pub fn validate_merkle_tree(
    tx_hash: Txid,
    merkle_root: TxMerkleNode,
    merkle_proof: &[u8],
    tx_index: u32,
) -> SpvResult<()> {
    let siblings = split_hashes(merkle_proof)
        .map_err(|_| SpvError::InvalidMerkleProofLength(merkle_proof.len()))?;
    let leaf = tx_hash.to_byte_array();

    if siblings.is_empty() {
        if tx_index == 0 && leaf == merkle_root.to_byte_array() {
            return Ok(());
        }

        return Err(SpvError::EmptyMerkleProof);
    }

    let mut index = tx_index;
    let mut current = leaf;
    let mut pair = [0u8; 64];

    for sibling in siblings {
        if index % 2 == 1 {
            pair[..32].copy_from_slice(&sibling);
            pair[32..].copy_from_slice(&current);
        } else {
            pair[..32].copy_from_slice(&current);
            pair[32..].copy_from_slice(&sibling);
        }

        current = sha256d(&pair);
        index >>= 1;
    }

    let computed = TxMerkleNode::from_byte_array(current);
    if computed != merkle_root {
        return Err(SpvError::MerkleRootMismatch {
            computed,
            expected: merkle_root,
        });
    }

    Ok(())
}
