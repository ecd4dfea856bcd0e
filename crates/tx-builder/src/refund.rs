//! Assembles the transaction through which a depositor reclaims a deposit after its refund
//! locktime.

use bitcoin::{absolute::LockTime, Address, Amount, Sequence, Transaction, Txid};
use tbtc_bridge_primitives::{
    deposit::DepositReceipt,
    key::SigningKey,
    scripts::general::{create_tx, create_tx_ins, create_tx_outs},
    types::UtxoWithTx,
};
use tracing::debug;

use crate::{
    errors::{TxBuilderError, TxBuilderResult},
    signer::sign_all,
    sweep::deposit_script_spend,
};

/// A signed deposit refund transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRefund {
    /// The signed transaction.
    pub transaction: Transaction,
}

impl DepositRefund {
    /// Hash of the refund transaction.
    pub fn txid(&self) -> Txid {
        self.transaction.compute_txid()
    }
}

/// Assembles and signs the refund of the deposit `utxo` to `refunder_address`.
///
/// The transaction is time-locked to the refund locktime of `receipt`, so it only becomes valid
/// once the median time past of the chain reaches it.
pub fn assemble_deposit_refund(
    fee: Amount,
    utxo: &UtxoWithTx,
    receipt: &DepositReceipt,
    refunder_address: &Address,
    refunder_key: &SigningKey,
) -> TxBuilderResult<DepositRefund> {
    // fails for uncompressed keys, which the deposit script cannot commit to
    let refunder_public_key_hash = refunder_key.public_key_hash()?;
    if refunder_public_key_hash != receipt.refund_public_key_hash {
        return Err(TxBuilderError::KeyMismatch { role: "refund" });
    }

    let spend = deposit_script_spend(utxo, receipt)?;

    let value = utxo
        .utxo
        .value
        .checked_sub(fee)
        .filter(|value| *value > Amount::ZERO)
        .ok_or(TxBuilderError::InsufficientFunds {
            required: fee,
            available: utxo.utxo.value,
        })?;

    let locktime = receipt.refund_locktime_timestamp();
    debug!(outpoint = %utxo.utxo.outpoint, %locktime, %value, "assembling deposit refund");

    let mut transaction = create_tx(
        create_tx_ins([utxo.utxo.outpoint]),
        create_tx_outs([(refunder_address.script_pubkey(), value)]),
    );
    transaction.lock_time = LockTime::from_consensus(locktime);
    for input in &mut transaction.input {
        input.sequence = Sequence::ENABLE_LOCKTIME_NO_RBF;
    }

    sign_all(&mut transaction, &[spend], refunder_key)?;

    Ok(DepositRefund { transaction })
}

#[cfg(test)]
mod tests {
    use bitcoin::consensus::encode::serialize_hex;
    use tbtc_bridge_primitives::{address::parse_address, network::BitcoinNetwork};
    use tbtc_bridge_test_utils::transactions::{
        parse_tx, receipt, signing_key, utxo_with_tx, P2SH_REFUND_TX, P2WSH_REFUND_TO_P2PKH_TX,
        P2WSH_REFUND_TX, REFUNDER_WIF, REFUND_P2SH_DEPOSIT_TX, REFUND_P2WSH_DEPOSIT_FOR_P2PKH_TX,
        REFUND_P2WSH_DEPOSIT_TX, WALLET_WIF,
    };

    use super::*;

    const WALLET_PKH: &str = "8db50eb52063ea9d98b3eac91489a90f738986f6";
    const REFUND_PKH: &str = "1b67f27537c7b30a23d8ccefb96a4cacfc72d9a1";

    fn refund_receipt() -> DepositReceipt {
        receipt(WALLET_PKH, REFUND_PKH, 1_674_820_800, 3_600)
    }

    fn address(address: &str) -> Address {
        parse_address(address, BitcoinNetwork::Testnet).expect("must be a testnet address")
    }

    #[test]
    fn test_p2wsh_refund() {
        let refund = assemble_deposit_refund(
            Amount::from_sat(1_520),
            &utxo_with_tx(REFUND_P2WSH_DEPOSIT_TX, 0),
            &refund_receipt(),
            &address("tb1qrdnlyafhc7es5g7cenhmj6jv4n789kdpw5kty9"),
            &signing_key(REFUNDER_WIF),
        )
        .expect("must assemble");

        assert_eq!(serialize_hex(&refund.transaction), P2WSH_REFUND_TX);
        assert_eq!(
            refund.txid().to_string(),
            "b49bd6c0219066f0c76d85818b047e4685425844cda42dae9b9508b9bfbb483d"
        );
        assert_eq!(refund.transaction.lock_time.to_consensus_u32(), 1_674_824_400);
        assert_eq!(refund.transaction.input[0].sequence.0, 0xffff_fffe);
    }

    #[test]
    fn test_p2sh_refund() {
        let refund = assemble_deposit_refund(
            Amount::from_sat(1_520),
            &utxo_with_tx(REFUND_P2SH_DEPOSIT_TX, 0),
            &refund_receipt(),
            &address("tb1qrdnlyafhc7es5g7cenhmj6jv4n789kdpw5kty9"),
            &signing_key(REFUNDER_WIF),
        )
        .expect("must assemble");

        assert_eq!(refund.transaction, parse_tx(P2SH_REFUND_TX));
        assert_eq!(
            refund.txid().to_string(),
            "7df9ed885525899ccbe144fd129062cec59be43d428b85fb847808b8790ad262"
        );
    }

    #[test]
    fn test_refund_to_p2pkh_address() {
        let refund = assemble_deposit_refund(
            Amount::from_sat(1_520),
            &utxo_with_tx(REFUND_P2WSH_DEPOSIT_FOR_P2PKH_TX, 0),
            &refund_receipt(),
            &address("mi1s4c2GtyVpqQb6MEpMbKimq3mwu5Z3a6"),
            &signing_key(REFUNDER_WIF),
        )
        .expect("must assemble");

        assert_eq!(serialize_hex(&refund.transaction), P2WSH_REFUND_TO_P2PKH_TX);
    }

    #[test]
    fn test_refund_with_wrong_key() {
        let err = assemble_deposit_refund(
            Amount::from_sat(1_520),
            &utxo_with_tx(REFUND_P2WSH_DEPOSIT_TX, 0),
            &refund_receipt(),
            &address("tb1qrdnlyafhc7es5g7cenhmj6jv4n789kdpw5kty9"),
            &signing_key(WALLET_WIF),
        )
        .expect_err("wallet key cannot refund");

        assert!(matches!(
            err,
            TxBuilderError::KeyMismatch { role: "refund" }
        ));
    }

    #[test]
    fn test_refund_fee_must_leave_an_output() {
        let err = assemble_deposit_refund(
            Amount::from_sat(100_000),
            &utxo_with_tx(REFUND_P2WSH_DEPOSIT_TX, 0),
            &refund_receipt(),
            &address("tb1qrdnlyafhc7es5g7cenhmj6jv4n789kdpw5kty9"),
            &signing_key(REFUNDER_WIF),
        )
        .expect_err("fee consumes the whole deposit");

        assert!(matches!(err, TxBuilderError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_refund_of_foreign_deposit() {
        // same refunder, different wallet
        let other = receipt(
            "e6f9d74726b19b75f16fe1e9feaec048aa4fa1d0",
            REFUND_PKH,
            1_674_820_800,
            3_600,
        );

        let err = assemble_deposit_refund(
            Amount::from_sat(1_520),
            &utxo_with_tx(REFUND_P2WSH_DEPOSIT_TX, 0),
            &other,
            &address("tb1qrdnlyafhc7es5g7cenhmj6jv4n789kdpw5kty9"),
            &signing_key(REFUNDER_WIF),
        )
        .expect_err("deposit is locked to another script");

        assert!(matches!(err, TxBuilderError::DepositScriptMismatch(_)));
    }
}
