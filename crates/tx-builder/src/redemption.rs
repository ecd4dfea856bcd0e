//! Assembles the transaction in which a wallet pays out redemption requests from its main UTXO.

use bitcoin::{Amount, Transaction, Txid};
use tbtc_bridge_primitives::{
    key::SigningKey,
    scripts::general::{create_tx, create_tx_ins, create_tx_outs, public_key_hash_script},
    types::{RedemptionRequest, Utxo, UtxoWithTx},
};
use tracing::debug;

use crate::{
    errors::{TxBuilderError, TxBuilderResult},
    signer::sign_all,
    sweep::main_utxo_spend,
};

/// A signed redemption transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    /// The signed transaction.
    pub transaction: Transaction,

    /// The change output paid back to the wallet, if anything was left.
    pub new_main_utxo: Option<Utxo>,
}

impl Redemption {
    /// Hash of the redemption transaction.
    pub fn txid(&self) -> Txid {
        self.transaction.compute_txid()
    }
}

/// Assembles and signs a redemption of `requests` from the wallet's `main_utxo`.
///
/// Each request gets one output worth `requested_amount - tx_max_fee - treasury_fee`, in the
/// order given. The transaction fee is the sum of the `tx_max_fee` of all requests. Whatever is
/// left goes back to the wallet as the last output, P2WPKH when `witness` is set and P2PKH
/// otherwise.
pub fn assemble_redemption(
    wallet_key: &SigningKey,
    witness: bool,
    main_utxo: &UtxoWithTx,
    requests: &[RedemptionRequest],
) -> TxBuilderResult<Redemption> {
    if requests.is_empty() {
        return Err(TxBuilderError::NoRedemptionRequests);
    }

    let wallet_public_key_hash = wallet_key.public_key_hash()?;
    let spend = main_utxo_spend(main_utxo, &wallet_public_key_hash)?;

    let mut outputs = Vec::with_capacity(requests.len() + 1);
    let mut total_fee = Amount::ZERO;
    let mut total_outputs = Amount::ZERO;

    for request in requests {
        let value = request
            .output_value()
            .ok_or(TxBuilderError::RedemptionFeesExceedAmount(
                request.requested_amount,
            ))?;

        total_outputs = total_outputs
            .checked_add(value)
            .ok_or(TxBuilderError::AmountOverflow)?;
        total_fee = total_fee
            .checked_add(request.tx_max_fee)
            .ok_or(TxBuilderError::AmountOverflow)?;

        outputs.push((request.redeemer_output_script.clone(), value));
    }

    let required = total_outputs
        .checked_add(total_fee)
        .ok_or(TxBuilderError::AmountOverflow)?;
    let change = main_utxo
        .utxo
        .value
        .checked_sub(required)
        .ok_or(TxBuilderError::InsufficientFunds {
            required,
            available: main_utxo.utxo.value,
        })?;

    if change > Amount::ZERO {
        outputs.push((
            public_key_hash_script(&wallet_public_key_hash, witness),
            change,
        ));
    }

    debug!(requests = %requests.len(), %total_fee, %change, "assembling redemption");

    let mut transaction = create_tx(
        create_tx_ins([main_utxo.utxo.outpoint]),
        create_tx_outs(outputs),
    );
    sign_all(&mut transaction, &[spend], wallet_key)?;

    let new_main_utxo = (change > Amount::ZERO).then(|| {
        Utxo::new(
            transaction.compute_txid(),
            requests.len() as u32,
            change,
        )
    });

    Ok(Redemption {
        transaction,
        new_main_utxo,
    })
}
