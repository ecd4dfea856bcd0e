//! Standard output script templates and transaction scaffolding.

use bitcoin::{
    absolute::LockTime,
    hashes::Hash,
    transaction::{self, Sequence},
    Amount, OutPoint, PubkeyHash, Script, ScriptBuf, Transaction, TxIn, TxOut, WPubkeyHash,
    Witness,
};

/// The output script templates the bridge builds or spends.
///
/// Every decision about how to spend an output switches on this type. Anything that is not one of
/// the four templates is [`ScriptType::Unrecognized`] and cannot be spent by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptType {
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    P2pkh,

    /// `OP_0 <20 bytes>`.
    P2wpkh,

    /// `OP_HASH160 <20 bytes> OP_EQUAL`.
    P2sh,

    /// `OP_0 <32 bytes>`.
    P2wsh,

    /// Any other script.
    Unrecognized,
}

impl ScriptType {
    /// Classifies `script` by matching the exact opcode and length template.
    pub fn classify(script: &Script) -> Self {
        if script.is_p2pkh() {
            Self::P2pkh
        } else if script.is_p2wpkh() {
            Self::P2wpkh
        } else if script.is_p2sh() {
            Self::P2sh
        } else if script.is_p2wsh() {
            Self::P2wsh
        } else {
            Self::Unrecognized
        }
    }

    /// Whether spending an output of this type places the unlocking data in the witness.
    pub const fn is_witness(self) -> bool {
        matches!(self, Self::P2wpkh | Self::P2wsh)
    }
}

/// Create a P2PKH output script for the given public key hash.
pub fn p2pkh_script(public_key_hash: &[u8; 20]) -> ScriptBuf {
    ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(*public_key_hash))
}

/// Create a P2WPKH output script for the given public key hash.
pub fn p2wpkh_script(public_key_hash: &[u8; 20]) -> ScriptBuf {
    ScriptBuf::new_p2wpkh(&WPubkeyHash::from_byte_array(*public_key_hash))
}

/// Create the output script of a wallet, P2WPKH when `witness` is set and P2PKH otherwise.
pub fn public_key_hash_script(public_key_hash: &[u8; 20], witness: bool) -> ScriptBuf {
    if witness {
        p2wpkh_script(public_key_hash)
    } else {
        p2pkh_script(public_key_hash)
    }
}

/// Create a bitcoin [`Transaction`] for the given inputs and outputs.
///
/// Bridge transactions use version 1 and no locktime.
pub fn create_tx(tx_ins: Vec<TxIn>, tx_outs: Vec<TxOut>) -> Transaction {
    Transaction {
        version: transaction::Version::ONE,
        lock_time: LockTime::ZERO,
        input: tx_ins,
        output: tx_outs,
    }
}

/// Create a list of unsigned [`TxIn`]'s from given [`OutPoint`]'s.
///
/// The `sequence` is final, which disables both replace-by-fee and the transaction locktime.
pub fn create_tx_ins(utxos: impl IntoIterator<Item = OutPoint>) -> Vec<TxIn> {
    utxos
        .into_iter()
        .map(|previous_output| TxIn {
            previous_output,
            sequence: Sequence::MAX,
            script_sig: ScriptBuf::default(),
            witness: Witness::new(),
        })
        .collect()
}

/// Create a list of [`TxOut`]'s based on pairs of scripts and corresponding amounts.
pub fn create_tx_outs(
    scripts_and_amounts: impl IntoIterator<Item = (ScriptBuf, Amount)>,
) -> Vec<TxOut> {
    scripts_and_amounts
        .into_iter()
        .map(|(script_pubkey, value)| TxOut {
            script_pubkey,
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture_receipt;

    const WALLET_PKH: [u8; 20] = [
        0x8d, 0xb5, 0x0e, 0xb5, 0x20, 0x63, 0xea, 0x9d, 0x98, 0xb3, 0xea, 0xc9, 0x14, 0x89, 0xa9,
        0x0f, 0x73, 0x89, 0x86, 0xf6,
    ];

    #[test]
    fn test_classify() {
        let receipt = fixture_receipt();
        let cases = [
            (p2pkh_script(&WALLET_PKH), ScriptType::P2pkh),
            (p2wpkh_script(&WALLET_PKH), ScriptType::P2wpkh),
            (receipt.output_script(false), ScriptType::P2sh),
            (receipt.output_script(true), ScriptType::P2wsh),
            (receipt.script(), ScriptType::Unrecognized),
            (ScriptBuf::new(), ScriptType::Unrecognized),
        ];

        for (script, expected) in cases {
            assert_eq!(ScriptType::classify(&script), expected, "{script:?}");
        }
    }

    #[test]
    fn test_public_key_hash_scripts() {
        assert_eq!(
            hex::encode(public_key_hash_script(&WALLET_PKH, true).as_bytes()),
            "00148db50eb52063ea9d98b3eac91489a90f738986f6"
        );
        assert_eq!(
            hex::encode(public_key_hash_script(&WALLET_PKH, false).as_bytes()),
            "76a9148db50eb52063ea9d98b3eac91489a90f738986f688ac"
        );
    }

    #[test]
    fn test_create_tx_defaults() {
        let tx = create_tx(
            create_tx_ins([OutPoint::null()]),
            create_tx_outs([(p2wpkh_script(&WALLET_PKH), Amount::from_sat(1_000))]),
        );

        assert_eq!(tx.version, transaction::Version::ONE);
        assert_eq!(tx.lock_time, LockTime::ZERO);
        assert_eq!(tx.input[0].sequence, Sequence::MAX);
        assert_eq!(tx.output[0].value, Amount::from_sat(1_000));
    }
}
