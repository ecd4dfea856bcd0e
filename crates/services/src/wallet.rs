//! Resolution of a wallet's main UTXO from the commitment the bridge stores.

use bitcoin::{Script, Transaction};
use tbtc_bridge_client::{bitcoin_client::BitcoinClient, bridge::Bridge};
use tbtc_bridge_primitives::{
    address::public_key_hash_to_address, network::BitcoinNetwork, types::Utxo,
};
use tracing::{debug, warn};

use crate::errors::ServiceResult;

pub use tbtc_bridge_client::{bitcoin_client::DEFAULT_HISTORY_DEPTH, bridge::build_main_utxo_hash};

/// Finds the main UTXO of the wallet identified by `wallet_public_key_hash`.
///
/// The bridge only stores a hash of the main UTXO, so the UTXO itself is searched for among the
/// last `history_depth` transactions of the wallet's P2WPKH address, then of its P2PKH address,
/// newest first. Returns [`None`] when the wallet has no main UTXO registered, or when the
/// registered one is older than the inspected history.
pub async fn determine_wallet_main_utxo<B, C>(
    bridge: &B,
    client: &C,
    wallet_public_key_hash: [u8; 20],
    network: BitcoinNetwork,
    history_depth: usize,
) -> ServiceResult<Option<Utxo>>
where
    B: Bridge + ?Sized,
    C: BitcoinClient + ?Sized,
{
    let wallet = bridge.wallets(wallet_public_key_hash).await?;
    if !wallet.has_main_utxo() {
        debug!("wallet has no main utxo registered");
        return Ok(None);
    }

    for witness in [true, false] {
        let address = public_key_hash_to_address(&wallet_public_key_hash, witness, network)?;
        let wallet_script = address.script_pubkey();
        let history = client
            .get_transaction_history(&address, Some(history_depth))
            .await?;

        let found = history
            .iter()
            .rev()
            .filter_map(|transaction| wallet_output(transaction, &wallet_script))
            .find(|candidate| bridge.build_utxo_hash(candidate) == wallet.main_utxo_hash);

        if let Some(main_utxo) = found {
            debug!(%address, outpoint = %main_utxo.outpoint, "found wallet main utxo");
            return Ok(Some(main_utxo));
        }
    }

    warn!(%history_depth, "main utxo not found in recent wallet history");

    Ok(None)
}

/// The first output of `transaction` locked to `wallet_script`, as a UTXO candidate.
fn wallet_output(transaction: &Transaction, wallet_script: &Script) -> Option<Utxo> {
    let txid = transaction.compute_txid();
    let found = transaction
        .output
        .iter()
        .enumerate()
        .find(|(_, output)| output.script_pubkey.as_script() == wallet_script)
        .map(|(vout, output)| Utxo::new(txid, vout as u32, output.value));

    if found.is_none() {
        warn!(%txid, "transaction from the wallet history has no wallet output");
    }

    found
}

#[cfg(test)]
mod tests {
    use bitcoin::{
        absolute::LockTime, transaction::Version, Amount, ScriptBuf, Transaction, TxOut,
    };
    use tbtc_bridge_primitives::types::{Wallet, WalletState};
    use tbtc_bridge_test_utils::{bitcoin_client::InMemoryBitcoinClient, bridge::InMemoryBridge};

    use super::*;

    const WALLET_PKH: [u8; 20] = [
        0xe6, 0xf9, 0xd7, 0x47, 0x26, 0xb1, 0x9b, 0x75, 0xf1, 0x6f, 0xe1, 0xe9, 0xfe, 0xae, 0xc0,
        0x48, 0xaa, 0x4f, 0xa1, 0xd0,
    ];

    const WITNESS_SCRIPT: &str = "0014e6f9d74726b19b75f16fe1e9feaec048aa4fa1d0";
    const LEGACY_SCRIPT: &str = "76a914e6f9d74726b19b75f16fe1e9feaec048aa4fa1d088ac";
    const OTHER_SCRIPT_1: &str = "00140000000000000000000000000000000000000001";
    const OTHER_SCRIPT_2: &str = "00140000000000000000000000000000000000000002";

    /// A transaction paying `outputs`, made unique by `lock_time`.
    fn transaction(lock_time: u32, outputs: &[(&str, u64)]) -> Transaction {
        Transaction {
            version: Version::ONE,
            lock_time: LockTime::from_consensus(lock_time),
            input: vec![],
            output: outputs
                .iter()
                .map(|(script, value)| TxOut {
                    value: Amount::from_sat(*value),
                    script_pubkey: ScriptBuf::from_hex(script).expect("must be valid hex"),
                })
                .collect(),
        }
    }

    fn witness_history() -> Vec<Transaction> {
        vec![
            transaction(1, &[(WITNESS_SCRIPT, 100_000), (OTHER_SCRIPT_1, 200_000)]),
            transaction(2, &[(OTHER_SCRIPT_1, 100_000), (WITNESS_SCRIPT, 200_000)]),
            transaction(
                3,
                &[
                    (OTHER_SCRIPT_1, 100_000),
                    (OTHER_SCRIPT_2, 200_000),
                    (WITNESS_SCRIPT, 300_000),
                ],
            ),
            transaction(4, &[(WITNESS_SCRIPT, 100_000), (OTHER_SCRIPT_1, 200_000)]),
            transaction(5, &[(WITNESS_SCRIPT, 100_000), (OTHER_SCRIPT_1, 200_000)]),
            transaction(6, &[(OTHER_SCRIPT_1, 100_000), (WITNESS_SCRIPT, 200_000)]),
        ]
    }

    fn legacy_history() -> Vec<Transaction> {
        vec![
            transaction(11, &[(OTHER_SCRIPT_1, 100_000), (LEGACY_SCRIPT, 200_000)]),
            transaction(
                12,
                &[
                    (OTHER_SCRIPT_1, 100_000),
                    (OTHER_SCRIPT_2, 200_000),
                    (LEGACY_SCRIPT, 300_000),
                ],
            ),
            transaction(13, &[(LEGACY_SCRIPT, 100_000), (OTHER_SCRIPT_1, 200_000)]),
            transaction(14, &[(LEGACY_SCRIPT, 100_000), (OTHER_SCRIPT_1, 200_000)]),
            transaction(15, &[(LEGACY_SCRIPT, 100_000), (OTHER_SCRIPT_1, 200_000)]),
            transaction(16, &[(OTHER_SCRIPT_1, 100_000), (LEGACY_SCRIPT, 200_000)]),
        ]
    }

    fn wallet(main_utxo_hash: [u8; 32]) -> Wallet {
        Wallet {
            main_utxo_hash,
            pending_redemptions_value: Amount::ZERO,
            created_at: 1_650_000_000,
            state: WalletState::Live,
        }
    }

    fn setup(network: BitcoinNetwork) -> InMemoryBitcoinClient {
        let client = InMemoryBitcoinClient::new(network);

        for (witness, history) in [(true, witness_history()), (false, legacy_history())] {
            let address = public_key_hash_to_address(&WALLET_PKH, witness, network)
                .expect("must be a valid address");
            client.set_history(&address, history);
        }

        client
    }

    fn utxo(transaction: &Transaction, vout: u32) -> Utxo {
        Utxo::new(
            transaction.compute_txid(),
            vout,
            transaction.output[vout as usize].value,
        )
    }

    #[tokio::test]
    async fn test_wallet_without_main_utxo() {
        let bridge = InMemoryBridge::default();
        bridge.set_wallet(WALLET_PKH, wallet([0u8; 32]));

        let main_utxo = determine_wallet_main_utxo(
            &bridge,
            &setup(BitcoinNetwork::Testnet),
            WALLET_PKH,
            BitcoinNetwork::Testnet,
            DEFAULT_HISTORY_DEPTH,
        )
        .await
        .expect("must resolve");

        assert_eq!(main_utxo, None);
    }

    #[tokio::test]
    async fn test_main_utxo_resolution() {
        let witness = witness_history();
        let legacy = legacy_history();

        let cases = [
            ("recent witness transaction", utxo(&witness[5], 1), true),
            ("recent legacy transaction", utxo(&legacy[4], 0), true),
            ("old witness transaction", utxo(&witness[0], 0), false),
            ("old legacy transaction", utxo(&legacy[0], 1), false),
        ];

        for network in [BitcoinNetwork::Testnet, BitcoinNetwork::Mainnet] {
            for (name, actual_main_utxo, found) in cases {
                let bridge = InMemoryBridge::default();
                bridge.set_wallet(WALLET_PKH, wallet(build_main_utxo_hash(&actual_main_utxo)));

                let main_utxo = determine_wallet_main_utxo(
                    &bridge,
                    &setup(network),
                    WALLET_PKH,
                    network,
                    DEFAULT_HISTORY_DEPTH,
                )
                .await
                .expect("must resolve");

                let expected = found.then_some(actual_main_utxo);
                assert_eq!(main_utxo, expected, "{name} on {network:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_deeper_history_finds_old_main_utxo() {
        let old_main_utxo = utxo(&witness_history()[0], 0);
        let bridge = InMemoryBridge::default();
        bridge.set_wallet(WALLET_PKH, wallet(build_main_utxo_hash(&old_main_utxo)));

        let main_utxo = determine_wallet_main_utxo(
            &bridge,
            &setup(BitcoinNetwork::Testnet),
            WALLET_PKH,
            BitcoinNetwork::Testnet,
            6,
        )
        .await
        .expect("must resolve");

        assert_eq!(main_utxo, Some(old_main_utxo));
    }
}
