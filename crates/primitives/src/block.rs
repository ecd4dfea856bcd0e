//! Bitcoin block headers and the proof-of-work arithmetic needed to validate a chain of them.

use bitcoin::{hashes::Hash, BlockHash, TxMerkleNode};
use ethnum::U256;

use crate::{
    errors::{PrimitivesError, PrimitivesResult},
    hash::sha256d,
};

/// Length of a serialized block header.
pub const BLOCK_HEADER_LENGTH: usize = 80;

/// The target of a difficulty 1 block, `0xffff * 256^26`.
pub const DIFF1_TARGET: U256 = U256::from_words(0xffff << 80, 0);

/// The header of a Bitcoin block.
///
/// Hashes are kept in the internal byte order, exactly as they appear in the serialized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHeader {
    /// Version that selects the set of validation rules.
    pub version: u32,

    /// Hash of the previous block's header.
    pub previous_block_header_hash: BlockHash,

    /// Root of the Merkle tree of the block's transactions.
    pub merkle_root_hash: TxMerkleNode,

    /// Unix time at which the miner started hashing the header.
    pub time: u32,

    /// Compact encoding of the target the header hash must not exceed.
    pub bits: u32,

    /// Value miners vary to produce a hash below the target.
    pub nonce: u32,
}

impl BlockHeader {
    /// Serializes the header into its 80-byte wire form.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_LENGTH] {
        let mut raw = [0u8; BLOCK_HEADER_LENGTH];

        raw[0..4].copy_from_slice(&self.version.to_le_bytes());
        raw[4..36].copy_from_slice(self.previous_block_header_hash.as_byte_array());
        raw[36..68].copy_from_slice(self.merkle_root_hash.as_byte_array());
        raw[68..72].copy_from_slice(&self.time.to_le_bytes());
        raw[72..76].copy_from_slice(&self.bits.to_le_bytes());
        raw[76..80].copy_from_slice(&self.nonce.to_le_bytes());

        raw
    }

    /// Deserializes a header from exactly 80 bytes.
    pub fn deserialize(raw: &[u8]) -> PrimitivesResult<Self> {
        let raw: &[u8; BLOCK_HEADER_LENGTH] =
            raw.try_into().map_err(|_| PrimitivesError::InvalidLength {
                field: "block header",
                expected: BLOCK_HEADER_LENGTH,
                actual: raw.len(),
            })?;

        let word = |offset: usize| {
            u32::from_le_bytes([
                raw[offset],
                raw[offset + 1],
                raw[offset + 2],
                raw[offset + 3],
            ])
        };
        let mut previous = [0u8; 32];
        previous.copy_from_slice(&raw[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&raw[36..68]);

        Ok(Self {
            version: word(0),
            previous_block_header_hash: BlockHash::from_byte_array(previous),
            merkle_root_hash: TxMerkleNode::from_byte_array(merkle_root),
            time: word(68),
            bits: word(72),
            nonce: word(76),
        })
    }

    /// Double SHA-256 of the serialized header.
    pub fn hash(&self) -> BlockHash {
        BlockHash::from_byte_array(sha256d(&self.serialize()))
    }

    /// The target decoded from [`Self::bits`].
    pub fn target(&self) -> PrimitivesResult<U256> {
        bits_to_target(self.bits)
    }

    /// The difficulty implied by [`Self::bits`].
    pub fn difficulty(&self) -> PrimitivesResult<U256> {
        target_to_difficulty(self.target()?)
    }

    /// Whether the header hash, read as a little-endian number, does not exceed the target.
    pub fn meets_target(&self) -> PrimitivesResult<bool> {
        let hash = U256::from_le_bytes(self.hash().to_byte_array());

        Ok(hash <= self.target()?)
    }
}

/// Splits a concatenation of serialized headers into [`BlockHeader`]s.
pub fn deserialize_headers_chain(raw: &[u8]) -> PrimitivesResult<Vec<BlockHeader>> {
    if raw.len() % BLOCK_HEADER_LENGTH != 0 {
        return Err(PrimitivesError::UnalignedLength {
            what: "headers chain",
            chunk: BLOCK_HEADER_LENGTH,
            actual: raw.len(),
        });
    }

    raw.chunks_exact(BLOCK_HEADER_LENGTH)
        .map(BlockHeader::deserialize)
        .collect()
}

/// Concatenates the serialized form of `headers`.
pub fn serialize_headers_chain(headers: &[BlockHeader]) -> Vec<u8> {
    headers.iter().flat_map(BlockHeader::serialize).collect()
}

/// Decodes the compact `bits` representation into a 256-bit target.
///
/// The most significant byte is a base-256 exponent and the lower three bytes are the mantissa, so
/// the target is `mantissa * 256^(exponent - 3)`.
pub fn bits_to_target(bits: u32) -> PrimitivesResult<U256> {
    let exponent = bits >> 24;
    let mantissa = U256::from(bits & 0x00ff_ffff);

    if exponent <= 3 {
        return Ok(mantissa >> (8 * (3 - exponent)));
    }

    let shift = 8 * (exponent - 3);
    let target = mantissa
        .checked_shl(shift)
        .ok_or(PrimitivesError::InvalidBits(bits))?;

    // bits shifted past the top would silently shrink the target
    if target >> shift != mantissa {
        return Err(PrimitivesError::InvalidBits(bits));
    }

    Ok(target)
}

/// Computes `DIFF1_TARGET / target`.
pub fn target_to_difficulty(target: U256) -> PrimitivesResult<U256> {
    if target == U256::ZERO {
        return Err(PrimitivesError::ZeroTarget);
    }

    Ok(DIFF1_TARGET / target)
}
