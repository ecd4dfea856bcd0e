//! Error types for the transaction assemblers.

use bitcoin::{sighash::P2wpkhError, transaction::InputsIndexError, Amount, OutPoint};
use tbtc_bridge_primitives::{errors::PrimitivesError, scripts::general::ScriptType};
use thiserror::Error;

/// Errors that can occur while assembling or signing a bridge transaction.
///
/// All of them are raised before the transaction is handed out, so a failed assembly never leaks a
/// partially signed transaction.
#[derive(Debug, Error)]
pub enum TxBuilderError {
    /// A key, script or receipt failed validation.
    #[error("primitives: {0}")]
    Primitives(#[from] PrimitivesError),

    /// The selected inputs cannot cover the outputs and the fee.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Value the transaction has to spend.
        required: Amount,

        /// Value of the inputs.
        available: Amount,
    },

    /// Summing amounts overflowed.
    #[error("amount overflow")]
    AmountOverflow,

    /// A sweep was requested without any deposit.
    #[error("there must be at least one deposit UTXO to sweep")]
    NoDeposits,

    /// The deposit UTXOs and their receipts do not pair up.
    #[error("number of UTXOs ({utxos}) must equal the number of deposit receipts ({receipts})")]
    DepositCountMismatch {
        /// Number of deposit UTXOs.
        utxos: usize,

        /// Number of deposit receipts.
        receipts: usize,
    },

    /// A redemption was requested without any request.
    #[error("there must be at least one request to redeem")]
    NoRedemptionRequests,

    /// The fees of a redemption request exceed the requested amount.
    #[error("fees of the redemption request exceed the requested amount {0}")]
    RedemptionFeesExceedAmount(Amount),

    /// The parent transaction does not contain the spent output.
    #[error("previous output {0} is not part of the supplied transaction")]
    MissingPreviousOutput(OutPoint),

    /// The UTXO value disagrees with the output of its parent transaction.
    #[error("value of {outpoint} is {actual}, expected {expected}")]
    ValueMismatch {
        /// The spent output.
        outpoint: OutPoint,

        /// Value declared by the UTXO.
        expected: Amount,

        /// Value found in the parent transaction.
        actual: Amount,
    },

    /// The previous output has a shape the assembler cannot spend.
    #[error("unsupported script type {script_type:?} of {outpoint}")]
    UnsupportedScript {
        /// The spent output.
        outpoint: OutPoint,

        /// Shape of its locking script.
        script_type: ScriptType,
    },

    /// The previous output is not locked to the signing key.
    #[error("{0} does not belong to the signing key")]
    NotOwned(OutPoint),

    /// The previous output is not locked to the script derived from the deposit receipt.
    #[error("{0} is not locked to the deposit script of its receipt")]
    DepositScriptMismatch(OutPoint),

    /// The signing key does not hash to the public key hash committed in the receipt.
    #[error("{role} public key does not correspond to the {role} private key")]
    KeyMismatch {
        /// Which key of the receipt was checked, `wallet` or `refund`.
        role: &'static str,
    },

    /// The transaction has no input at the index being signed.
    #[error("sighash: {0}")]
    InputIndex(#[from] InputsIndexError),

    /// The P2WPKH sighash could not be computed.
    #[error("p2wpkh sighash: {0}")]
    P2wpkhSighash(#[from] P2wpkhError),

    /// A script element does not fit into a single push.
    #[error("script push too large: {0}")]
    PushBytes(#[from] bitcoin::script::PushBytesError),
}

/// Wrapper type for results that can fail with a [`TxBuilderError`].
pub type TxBuilderResult<T> = Result<T, TxBuilderError>;
