//! Assembles the transaction that locks a deposit to its deposit script.

use bitcoin::{Amount, Transaction, Txid};
use tbtc_bridge_primitives::{
    deposit::DepositReceipt,
    key::SigningKey,
    scripts::general::{create_tx, create_tx_ins, create_tx_outs, p2wpkh_script, ScriptType},
    types::{Utxo, UtxoWithTx},
};
use tracing::debug;

use crate::{
    errors::{TxBuilderError, TxBuilderResult},
    signer::{checked_previous_output, sign_all, Spend},
};

/// Index of the deposit output in a funding transaction.
pub const DEPOSIT_OUTPUT_INDEX: u32 = 0;

/// A signed deposit funding transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositFunding {
    /// The signed transaction.
    pub transaction: Transaction,

    /// The deposit output, always at [`DEPOSIT_OUTPUT_INDEX`].
    pub deposit_utxo: Utxo,
}

impl DepositFunding {
    /// Hash of the funding transaction.
    pub fn txid(&self) -> Txid {
        self.deposit_utxo.outpoint.txid
    }
}

/// Assembles and signs a transaction that sends `amount` to the deposit address of `receipt`.
///
/// `inputs` are consumed in order until they cover `amount + fee`. Only P2WPKH outputs of the
/// depositor are spent; other candidates are skipped. Any remainder goes back to the depositor's
/// P2WPKH address as a second output.
pub fn assemble_deposit_funding(
    receipt: &DepositReceipt,
    amount: Amount,
    fee: Amount,
    inputs: &[UtxoWithTx],
    depositor_key: &SigningKey,
    witness: bool,
) -> TxBuilderResult<DepositFunding> {
    let depositor_script = p2wpkh_script(&depositor_key.public_key_hash()?);
    let required = amount
        .checked_add(fee)
        .ok_or(TxBuilderError::AmountOverflow)?;

    let mut selected = Vec::new();
    let mut available = Amount::ZERO;

    for input in inputs {
        let is_p2wpkh = input.previous_output().is_some_and(|output| {
            ScriptType::classify(&output.script_pubkey) == ScriptType::P2wpkh
        });
        if !is_p2wpkh {
            debug!(outpoint = %input.utxo.outpoint, "skipping non-P2WPKH funding candidate");
            continue;
        }

        let previous_output = checked_previous_output(input)?;

        if previous_output.script_pubkey != depositor_script {
            return Err(TxBuilderError::NotOwned(input.utxo.outpoint));
        }

        selected.push((
            input.utxo.outpoint,
            Spend::P2wpkh {
                script_pubkey: previous_output.script_pubkey.clone(),
                value: previous_output.value,
            },
        ));
        available = available
            .checked_add(input.utxo.value)
            .ok_or(TxBuilderError::AmountOverflow)?;

        if available >= required {
            break;
        }
    }

    if available < required {
        return Err(TxBuilderError::InsufficientFunds {
            required,
            available,
        });
    }

    let mut outputs = vec![(receipt.output_script(witness), amount)];
    let change = available - required;
    if change > Amount::ZERO {
        outputs.push((depositor_script, change));
    }

    debug!(inputs = %selected.len(), %available, %change, "assembling deposit funding");

    let (outpoints, spends): (Vec<_>, Vec<_>) = selected.into_iter().unzip();
    let mut transaction = create_tx(create_tx_ins(outpoints), create_tx_outs(outputs));
    sign_all(&mut transaction, &spends, depositor_key)?;

    let deposit_utxo = Utxo::new(transaction.compute_txid(), DEPOSIT_OUTPUT_INDEX, amount);

    Ok(DepositFunding {
        transaction,
        deposit_utxo,
    })
}
