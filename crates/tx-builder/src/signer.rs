//! ECDSA signing of the inputs spent by bridge transactions.
//!
//! Every bridge transaction is signed with `SIGHASH_ALL` by a single key. Sighashes are computed
//! over the unsigned transaction first, and the unlocking data is attached once every input has
//! been signed.

use bitcoin::{
    ecdsa,
    hashes::Hash,
    script::{Builder, PushBytesBuf},
    sighash::{EcdsaSighashType, SighashCache},
    Amount, ScriptBuf, Transaction, TxIn, TxOut, Witness,
};
use tbtc_bridge_primitives::{key::SigningKey, types::UtxoWithTx};

use crate::errors::{TxBuilderError, TxBuilderResult};

/// How a single input is spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spend {
    /// A P2PKH output, unlocked by `<sig> <pubkey>` in the script sig.
    P2pkh {
        /// The spent output script, also used as the script code.
        script_pubkey: ScriptBuf,
    },

    /// A P2WPKH output, unlocked by the `[sig, pubkey]` witness.
    P2wpkh {
        /// The spent output script.
        script_pubkey: ScriptBuf,

        /// Value of the spent output.
        value: Amount,
    },

    /// A P2SH deposit, unlocked by `<sig> <pubkey> <deposit script>` in the script sig.
    P2shDeposit {
        /// The deposit redeem script.
        deposit_script: ScriptBuf,
    },

    /// A P2WSH deposit, unlocked by the `[sig, pubkey, deposit script]` witness.
    P2wshDeposit {
        /// The deposit witness script.
        deposit_script: ScriptBuf,

        /// Value of the spent output.
        value: Amount,
    },
}

/// Unlocking data of a signed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputUnlock {
    /// Goes into the input's script sig.
    ScriptSig(ScriptBuf),

    /// Goes into the input's witness.
    Witness(Witness),
}

impl InputUnlock {
    /// Attaches the unlocking data to `input`.
    pub fn apply(self, input: &mut TxIn) {
        match self {
            Self::ScriptSig(script_sig) => input.script_sig = script_sig,
            Self::Witness(witness) => input.witness = witness,
        }
    }
}

/// Signs input `input_index` of the transaction behind `cache`.
pub fn sign_input(
    cache: &mut SighashCache<&Transaction>,
    input_index: usize,
    spend: &Spend,
    key: &SigningKey,
) -> TxBuilderResult<InputUnlock> {
    let sighash_type = EcdsaSighashType::All;

    let digest = match spend {
        Spend::P2pkh { script_pubkey } => cache
            .legacy_signature_hash(input_index, script_pubkey, sighash_type.to_u32())?
            .to_byte_array(),
        Spend::P2shDeposit { deposit_script } => cache
            .legacy_signature_hash(input_index, deposit_script, sighash_type.to_u32())?
            .to_byte_array(),
        Spend::P2wpkh {
            script_pubkey,
            value,
        } => cache
            .p2wpkh_signature_hash(input_index, script_pubkey, *value, sighash_type)?
            .to_byte_array(),
        Spend::P2wshDeposit {
            deposit_script,
            value,
        } => cache
            .p2wsh_signature_hash(input_index, deposit_script, *value, sighash_type)?
            .to_byte_array(),
    };

    let signature = ecdsa::Signature::sighash_all(key.sign_digest(digest)).to_vec();
    let public_key = key.public_key().to_bytes();

    Ok(match spend {
        Spend::P2pkh { .. } => InputUnlock::ScriptSig(
            Builder::new()
                .push_slice(PushBytesBuf::try_from(signature)?)
                .push_slice(PushBytesBuf::try_from(public_key)?)
                .into_script(),
        ),
        Spend::P2shDeposit { deposit_script } => InputUnlock::ScriptSig(
            Builder::new()
                .push_slice(PushBytesBuf::try_from(signature)?)
                .push_slice(PushBytesBuf::try_from(public_key)?)
                .push_slice(PushBytesBuf::try_from(deposit_script.to_bytes())?)
                .into_script(),
        ),
        Spend::P2wpkh { .. } => InputUnlock::Witness(Witness::from_slice(&[signature, public_key])),
        Spend::P2wshDeposit { deposit_script, .. } => InputUnlock::Witness(Witness::from_slice(&[
            signature,
            public_key,
            deposit_script.to_bytes(),
        ])),
    })
}

/// Signs every input of `tx` with `key`, `spends[i]` describing input `i`.
pub fn sign_all(tx: &mut Transaction, spends: &[Spend], key: &SigningKey) -> TxBuilderResult<()> {
    let unlocks = {
        let mut cache = SighashCache::new(&*tx);

        spends
            .iter()
            .enumerate()
            .map(|(input_index, spend)| sign_input(&mut cache, input_index, spend, key))
            .collect::<TxBuilderResult<Vec<_>>>()?
    };

    for (input, unlock) in tx.input.iter_mut().zip(unlocks) {
        unlock.apply(input);
    }

    Ok(())
}

/// Returns the output spent by `utxo`, checking that its value matches the declared one.
pub fn checked_previous_output(utxo: &UtxoWithTx) -> TxBuilderResult<&TxOut> {
    let outpoint = utxo.utxo.outpoint;
    let previous_output = utxo
        .previous_output()
        .ok_or(TxBuilderError::MissingPreviousOutput(outpoint))?;

    if previous_output.value != utxo.utxo.value {
        return Err(TxBuilderError::ValueMismatch {
            outpoint,
            expected: utxo.utxo.value,
            actual: previous_output.value,
        });
    }

    Ok(previous_output)
}
