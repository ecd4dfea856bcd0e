//! Binary codec for the parts of Bitcoin's consensus serialization that the bridge consumes
//! directly.

use bitcoin::{
    consensus::{
        self,
        encode::{serialize, VarInt},
        Decodable,
    },
    hashes::Hash,
    Transaction, Txid,
};

use crate::{
    errors::{PrimitivesError, PrimitivesResult},
    hash::sha256d,
};

/// A transaction split into the four vectors the on-chain bridge expects when a transaction is
/// submitted together with its SPV proof.
///
/// The witness data is not part of any vector, so concatenating the vectors yields the legacy
/// serialization whose double-SHA256 is the transaction id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedRawTransaction {
    /// 4-byte little-endian transaction version.
    pub version: [u8; 4],

    /// Compact-size input count followed by every serialized input.
    pub inputs: Vec<u8>,

    /// Compact-size output count followed by every serialized output.
    pub outputs: Vec<u8>,

    /// 4-byte little-endian locktime.
    pub locktime: [u8; 4],
}

impl DecomposedRawTransaction {
    /// Splits a transaction into its version, inputs, outputs and locktime vectors.
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            version: tx.version.0.to_le_bytes(),
            inputs: serialize(&tx.input),
            outputs: serialize(&tx.output),
            locktime: tx.lock_time.to_consensus_u32().to_le_bytes(),
        }
    }

    /// Decodes a raw transaction, with or without witness data, and decomposes it.
    pub fn from_raw(raw: &[u8]) -> PrimitivesResult<Self> {
        let tx: Transaction = consensus::deserialize(raw)?;

        Ok(Self::from_transaction(&tx))
    }

    /// Concatenates `version ‖ inputs ‖ outputs ‖ locktime`.
    pub fn concatenate(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(self.version.len() + self.inputs.len() + self.outputs.len() + 4);
        buf.extend_from_slice(&self.version);
        buf.extend_from_slice(&self.inputs);
        buf.extend_from_slice(&self.outputs);
        buf.extend_from_slice(&self.locktime);

        buf
    }

    /// Computes the transaction id from the decomposed vectors.
    pub fn compute_txid(&self) -> Txid {
        Txid::from_byte_array(sha256d(&self.concatenate()))
    }

    /// Number of inputs as declared by the compact-size prefix of the inputs vector.
    pub fn input_count(&self) -> PrimitivesResult<u64> {
        read_compact_size(&self.inputs).map(|(count, _)| count)
    }

    /// Number of outputs as declared by the compact-size prefix of the outputs vector.
    pub fn output_count(&self) -> PrimitivesResult<u64> {
        read_compact_size(&self.outputs).map(|(count, _)| count)
    }
}

/// Encodes `value` as a Bitcoin compact-size unsigned integer.
pub fn write_compact_size(value: u64) -> Vec<u8> {
    serialize(&VarInt(value))
}

/// Reads a compact-size unsigned integer from the start of `bytes`.
///
/// Returns the decoded value and the number of bytes it occupied.
pub fn read_compact_size(bytes: &[u8]) -> PrimitivesResult<(u64, usize)> {
    let mut reader = bytes;
    let VarInt(value) = VarInt::consensus_decode(&mut reader)?;

    Ok((value, bytes.len() - reader.len()))
}

/// Splits a concatenation of 32-byte hashes into its items.
pub fn split_hashes(blob: &[u8]) -> PrimitivesResult<Vec<[u8; 32]>> {
    if blob.len() % 32 != 0 {
        return Err(PrimitivesError::UnalignedLength {
            what: "hash list",
            chunk: 32,
            actual: blob.len(),
        });
    }

    Ok(blob
        .chunks_exact(32)
        .map(|chunk| {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(chunk);
            hash
        })
        .collect())
}
