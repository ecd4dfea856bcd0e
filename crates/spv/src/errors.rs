//! Errors raised while assembling or validating SPV proofs.

use bitcoin::{BlockHash, TxMerkleNode, Txid};
use ethnum::U256;
use tbtc_bridge_client::errors::ClientError;
use tbtc_bridge_primitives::errors::PrimitivesError;
use thiserror::Error;

/// Errors that can occur while assembling or validating an SPV proof.
///
/// Every proof failure is final. A proof that fails validation is never reported as merely
/// unproven.
#[derive(Debug, Error)]
pub enum SpvError {
    /// The data source could not be queried.
    #[error("bitcoin client: {0}")]
    Client(#[from] ClientError),

    /// The data returned by the data source could not be decoded.
    #[error("primitives: {0}")]
    Primitives(#[from] PrimitivesError),

    /// A proof was requested with zero required confirmations.
    #[error("the number of required confirmations must be at least 1")]
    ZeroRequiredConfirmations,

    /// The transaction does not have enough confirmations yet.
    #[error("transaction confirmations number [{confirmations}] is not enough, required [{required}]")]
    InsufficientConfirmations {
        /// Confirmations reported by the data source.
        confirmations: u32,

        /// Confirmations the proof needs.
        required: u32,
    },

    /// The reported confirmations exceed the height of the chain.
    #[error("{confirmations} confirmations are impossible at chain height {latest_block_height}")]
    InconsistentChainHeight {
        /// Confirmations reported by the data source.
        confirmations: u32,

        /// Height of the chain tip reported by the data source.
        latest_block_height: u64,
    },

    /// The header chain does not have one header per required confirmation.
    #[error("wrong number of confirmations: expected {expected} headers, got {actual}")]
    WrongHeaderCount {
        /// Number of required confirmations.
        expected: u32,

        /// Number of headers in the proof.
        actual: usize,
    },

    /// The raw transaction does not hash to the proven transaction hash.
    #[error("raw transaction hashes to {actual}, expected {expected}")]
    TxHashMismatch {
        /// The transaction hash being proven.
        expected: Txid,

        /// Hash of the fetched raw transaction.
        actual: Txid,
    },

    /// The Merkle proof is not a concatenation of 32-byte hashes.
    #[error("incorrect length of Merkle proof: {0} bytes")]
    InvalidMerkleProofLength(usize),

    /// The Merkle proof is empty while the transaction is not the only one in its block.
    #[error("invalid merkle tree: empty proof")]
    EmptyMerkleProof,

    /// The Merkle branch does not lead to the root committed in the header.
    #[error("transaction merkle proof computes root {computed}, header commits to {expected}")]
    MerkleRootMismatch {
        /// Root computed from the branch.
        computed: TxMerkleNode,

        /// Root stored in the header.
        expected: TxMerkleNode,
    },

    /// A header does not reference the header before it.
    #[error("invalid headers chain at header {index}: expected parent {expected}, found {found}")]
    BrokenChain {
        /// Position of the offending header.
        index: usize,

        /// Hash of the previous header.
        expected: BlockHash,

        /// Parent hash stored in the offending header.
        found: BlockHash,
    },

    /// A header hash exceeds the target encoded in its bits.
    #[error("insufficient work in header {index} ({block_hash})")]
    InsufficientWork {
        /// Position of the offending header.
        index: usize,

        /// Hash of the offending header.
        block_hash: BlockHash,
    },

    /// A header carries neither the previous nor the current epoch difficulty.
    #[error("header {index} difficulty {difficulty} not at current or previous difficulty")]
    UnexpectedDifficulty {
        /// Position of the offending header.
        index: usize,

        /// Difficulty of the offending header.
        difficulty: U256,
    },

    /// A header carries the previous epoch difficulty after a current epoch header.
    #[error("header {index} returns to the previous epoch difficulty")]
    DifficultyRegression {
        /// Position of the offending header.
        index: usize,
    },
}

/// Result type alias for [`SpvError`].
pub type SpvResult<T> = Result<T, SpvError>;
