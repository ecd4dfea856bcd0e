//! Errors raised by the bridge flows.

use bitcoin::{OutPoint, ScriptBuf};
use tbtc_bridge_client::errors::ClientError;
use tbtc_bridge_primitives::{
    errors::PrimitivesError, network::BitcoinNetwork, types::RedemptionRequestKind,
};
use tbtc_bridge_spv::errors::SpvError;
use tbtc_bridge_tx_builder::errors::TxBuilderError;
use thiserror::Error;

/// Errors that can occur while running a bridge flow.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input data.
    #[error("primitives: {0}")]
    Primitives(#[from] PrimitivesError),

    /// A collaborator call failed.
    #[error("client: {0}")]
    Client(#[from] ClientError),

    /// The transaction could not be assembled.
    #[error("tx builder: {0}")]
    TxBuilder(#[from] TxBuilderError),

    /// The transaction could not be proven.
    #[error("spv: {0}")]
    Spv(#[from] SpvError),

    /// The bridge does not know a redemption request for the wallet and output script.
    #[error("{kind:?} redemption request for script {redeemer_output_script} does not exist")]
    RedemptionRequestNotFound {
        /// Output script of the redeemer.
        redeemer_output_script: ScriptBuf,

        /// The set of requests that was searched.
        kind: RedemptionRequestKind,
    },

    /// The bridge already knows the deposit.
    #[error("deposit {0} is already revealed")]
    DepositAlreadyRevealed(OutPoint),

    /// The bridge does not know the deposit, so it would not accept a sweep of it.
    #[error("deposit {0} is not revealed")]
    DepositNotRevealed(OutPoint),

    /// The deposit was already swept into a main UTXO.
    #[error("deposit {0} is already swept")]
    DepositAlreadySwept(OutPoint),

    /// The bridge has no wallet accepting deposits.
    #[error("no active wallet")]
    NoActiveWallet,

    /// The Bitcoin data source is connected to another network than the one requested.
    #[error("bitcoin client works on {actual:?}, expected {expected:?}")]
    NetworkMismatch {
        /// Network the flow was asked to work on.
        expected: BitcoinNetwork,

        /// Network reported by the data source.
        actual: BitcoinNetwork,
    },
}

/// Result type alias for [`ServiceError`].
pub type ServiceResult<T> = Result<T, ServiceError>;
