//! Errors raised by the Bitcoin data source and the bridge handle.

use bitcoin::Txid;
use tbtc_bridge_primitives::errors::PrimitivesError;
use thiserror::Error;

/// Revert reason the bridge reports when a deposit is revealed twice.
pub const DEPOSIT_ALREADY_REVEALED: &str = "Deposit already revealed";

/// Errors that can occur while talking to an external collaborator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The data source does not know the transaction.
    #[error("transaction {0} not found")]
    TransactionNotFound(Txid),

    /// The request could not be completed; retrying may help.
    #[error("request failed: {0}")]
    Request(String),

    /// A bridge call reverted with the given reason.
    #[error("call reverted: {reason}")]
    Reverted {
        /// Human readable revert reason.
        reason: String,
    },

    /// The data returned by the collaborator is malformed.
    #[error("malformed response: {0}")]
    Malformed(#[from] PrimitivesError),
}

impl ClientError {
    /// Whether retrying the same call can never succeed.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Reverted { reason } => reason.contains(DEPOSIT_ALREADY_REVEALED),
            Self::TransactionNotFound(_) | Self::Request(_) | Self::Malformed(_) => false,
        }
    }
}

/// Result type alias for [`ClientError`].
pub type ClientResult<T> = Result<T, ClientError>;
