//! Assembles the transaction in which a wallet sweeps revealed deposits into its main UTXO.

use bitcoin::{Amount, Transaction, Txid};
use tbtc_bridge_primitives::{
    deposit::DepositReceipt,
    key::SigningKey,
    scripts::general::{
        create_tx, create_tx_ins, create_tx_outs, public_key_hash_script, ScriptType,
    },
    types::{Utxo, UtxoWithTx},
};
use tracing::debug;

use crate::{
    errors::{TxBuilderError, TxBuilderResult},
    signer::{checked_previous_output, sign_all, Spend},
};

/// A signed deposit sweep transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositSweep {
    /// The signed transaction.
    pub transaction: Transaction,

    /// The single output of the sweep, which becomes the wallet's main UTXO.
    pub new_main_utxo: Utxo,
}

impl DepositSweep {
    /// Hash of the sweep transaction.
    pub fn txid(&self) -> Txid {
        self.new_main_utxo.outpoint.txid
    }
}

/// Assembles and signs a sweep of `deposits` (paired index by index with `receipts`) and the
/// optional current `main_utxo` of the wallet.
///
/// The main UTXO, if any, is the first input. The only output pays `Σ inputs - fee` to the wallet,
/// as P2WPKH when `witness` is set and P2PKH otherwise.
pub fn assemble_deposit_sweep(
    fee: Amount,
    wallet_key: &SigningKey,
    witness: bool,
    deposits: &[UtxoWithTx],
    receipts: &[DepositReceipt],
    main_utxo: Option<&UtxoWithTx>,
) -> TxBuilderResult<DepositSweep> {
    if deposits.is_empty() {
        return Err(TxBuilderError::NoDeposits);
    }

    if deposits.len() != receipts.len() {
        return Err(TxBuilderError::DepositCountMismatch {
            utxos: deposits.len(),
            receipts: receipts.len(),
        });
    }

    let wallet_public_key_hash = wallet_key.public_key_hash()?;

    let mut inputs = Vec::with_capacity(deposits.len() + 1);
    if let Some(main_utxo) = main_utxo {
        inputs.push((main_utxo.utxo, main_utxo_spend(main_utxo, &wallet_public_key_hash)?));
    }
    for (deposit, receipt) in deposits.iter().zip(receipts) {
        inputs.push((
            deposit.utxo,
            deposit_spend(deposit, receipt, &wallet_public_key_hash)?,
        ));
    }

    let available = inputs
        .iter()
        .try_fold(Amount::ZERO, |sum, (utxo, _)| sum.checked_add(utxo.value))
        .ok_or(TxBuilderError::AmountOverflow)?;
    let output_value = available
        .checked_sub(fee)
        .filter(|value| *value > Amount::ZERO)
        .ok_or(TxBuilderError::InsufficientFunds {
            required: fee,
            available,
        })?;

    debug!(
        deposits = %deposits.len(),
        has_main_utxo = main_utxo.is_some(),
        %output_value,
        "assembling deposit sweep"
    );

    let (utxos, spends): (Vec<_>, Vec<_>) = inputs.into_iter().unzip();
    let mut transaction = create_tx(
        create_tx_ins(utxos.iter().map(|utxo| utxo.outpoint)),
        create_tx_outs([(
            public_key_hash_script(&wallet_public_key_hash, witness),
            output_value,
        )]),
    );
    sign_all(&mut transaction, &spends, wallet_key)?;

    let new_main_utxo = Utxo::new(transaction.compute_txid(), 0, output_value);

    Ok(DepositSweep {
        transaction,
        new_main_utxo,
    })
}

/// Checks that `main_utxo` is a P2PKH or P2WPKH output of the wallet and describes its spend.
pub(crate) fn main_utxo_spend(
    main_utxo: &UtxoWithTx,
    wallet_public_key_hash: &[u8; 20],
) -> TxBuilderResult<Spend> {
    let outpoint = main_utxo.utxo.outpoint;
    let previous_output = checked_previous_output(main_utxo)?;
    let script_pubkey = previous_output.script_pubkey.clone();
    let script_type = ScriptType::classify(&script_pubkey);

    let spend = match script_type {
        ScriptType::P2pkh => Spend::P2pkh {
            script_pubkey: script_pubkey.clone(),
        },
        ScriptType::P2wpkh => Spend::P2wpkh {
            script_pubkey: script_pubkey.clone(),
            value: previous_output.value,
        },
        _ => {
            return Err(TxBuilderError::UnsupportedScript {
                outpoint,
                script_type,
            })
        }
    };

    if script_pubkey != public_key_hash_script(wallet_public_key_hash, script_type.is_witness()) {
        return Err(TxBuilderError::NotOwned(outpoint));
    }

    Ok(spend)
}

/// Checks that `deposit` is locked to the script of `receipt` under the wallet's key and describes
/// its spend through the wallet branch.
fn deposit_spend(
    deposit: &UtxoWithTx,
    receipt: &DepositReceipt,
    wallet_public_key_hash: &[u8; 20],
) -> TxBuilderResult<Spend> {
    if receipt.wallet_public_key_hash != *wallet_public_key_hash {
        return Err(TxBuilderError::KeyMismatch { role: "wallet" });
    }

    deposit_script_spend(deposit, receipt)
}

/// Describes the spend of a P2SH or P2WSH deposit output locked to the script of `receipt`.
pub(crate) fn deposit_script_spend(
    deposit: &UtxoWithTx,
    receipt: &DepositReceipt,
) -> TxBuilderResult<Spend> {
    let outpoint = deposit.utxo.outpoint;
    let previous_output = checked_previous_output(deposit)?;
    let script_type = ScriptType::classify(&previous_output.script_pubkey);

    let spend = match script_type {
        ScriptType::P2sh => Spend::P2shDeposit {
            deposit_script: receipt.script(),
        },
        ScriptType::P2wsh => Spend::P2wshDeposit {
            deposit_script: receipt.script(),
            value: previous_output.value,
        },
        _ => {
            return Err(TxBuilderError::UnsupportedScript {
                outpoint,
                script_type,
            })
        }
    };

    if previous_output.script_pubkey != receipt.output_script(script_type.is_witness()) {
        return Err(TxBuilderError::DepositScriptMismatch(outpoint));
    }

    Ok(spend)
}
