//! Wallet maintenance flows: sweeping deposits, handling redemptions and proving both to the
//! bridge.

use bitcoin::{hashes::Hash, Amount, PublicKey, Script, ScriptBuf, Txid};
use tbtc_bridge_client::{bitcoin_client::BitcoinClient, bridge::Bridge};
use tbtc_bridge_primitives::{
    address::address_to_output_script,
    deposit::DepositReceipt,
    key::SigningKey,
    network::BitcoinNetwork,
    types::{ChainIdentifier, HostChainTxHash, RedemptionRequest, RedemptionRequestKind, Utxo},
};
use tbtc_bridge_spv::proof::{assemble_spv_proof, ProvenTransaction};
use tbtc_bridge_tx_builder::{
    redemption::{assemble_redemption, Redemption},
    sweep::{assemble_deposit_sweep, DepositSweep},
};
use tracing::{debug, info};

use crate::{
    errors::{ServiceError, ServiceResult},
    fetch::{ensure_network, utxo_with_tx, utxos_with_txs},
};

/// Sweeps the revealed `deposits` (paired index by index with `receipts`) and the optional
/// current `main_utxo` of the wallet into a new main UTXO, and broadcasts the transaction.
///
/// Fails without broadcasting when the bridge does not know one of the deposits or already saw
/// it swept.
#[allow(clippy::too_many_arguments)]
pub async fn submit_deposit_sweep<C, B>(
    client: &C,
    bridge: &B,
    network: BitcoinNetwork,
    fee: Amount,
    wallet_key: &SigningKey,
    witness: bool,
    deposits: &[Utxo],
    receipts: &[DepositReceipt],
    main_utxo: Option<Utxo>,
) -> ServiceResult<DepositSweep>
where
    C: BitcoinClient + ?Sized,
    B: Bridge + ?Sized,
{
    ensure_network(client, network).await?;

    for deposit in deposits {
        let request = bridge.deposits(deposit.outpoint).await?;
        if !request.is_revealed() {
            return Err(ServiceError::DepositNotRevealed(deposit.outpoint));
        }
        if request.is_swept() {
            return Err(ServiceError::DepositAlreadySwept(deposit.outpoint));
        }
    }

    let deposits = utxos_with_txs(client, deposits).await?;
    let main_utxo = match main_utxo {
        Some(utxo) => Some(utxo_with_tx(client, utxo).await?),
        None => None,
    };

    let sweep = assemble_deposit_sweep(
        fee,
        wallet_key,
        witness,
        &deposits,
        receipts,
        main_utxo.as_ref(),
    )?;

    client.broadcast(&sweep.transaction).await?;
    info!(
        txid = %sweep.txid(),
        deposits = deposits.len(),
        new_main_utxo = %sweep.new_main_utxo.value,
        "broadcast deposit sweep"
    );

    Ok(sweep)
}

/// Handles the pending redemption requests of the wallet for every script of
/// `redeemer_output_scripts` from its `main_utxo`, and broadcasts the transaction.
///
/// Every request is read from the bridge. Fails without broadcasting when one of them does not
/// exist.
pub async fn submit_redemption<C, B>(
    client: &C,
    bridge: &B,
    network: BitcoinNetwork,
    wallet_key: &SigningKey,
    main_utxo: Utxo,
    redeemer_output_scripts: &[ScriptBuf],
    witness: bool,
) -> ServiceResult<Redemption>
where
    C: BitcoinClient + ?Sized,
    B: Bridge + ?Sized,
{
    ensure_network(client, network).await?;

    let wallet_public_key_hash = wallet_key.public_key_hash()?;

    let mut requests = Vec::with_capacity(redeemer_output_scripts.len());
    for script in redeemer_output_scripts {
        let request = redemption_request(
            bridge,
            wallet_public_key_hash,
            script,
            RedemptionRequestKind::Pending,
        )
        .await?;
        requests.push(request);
    }

    let main_utxo = utxo_with_tx(client, main_utxo).await?;
    let redemption = assemble_redemption(wallet_key, witness, &main_utxo, &requests)?;

    client.broadcast(&redemption.transaction).await?;
    info!(
        txid = %redemption.txid(),
        requests = requests.len(),
        "broadcast redemption"
    );

    Ok(redemption)
}

/// Proves the deposit sweep `tx_hash` to the bridge.
///
/// `main_utxo` is the main UTXO the sweep spent, if any. The proof carries as many headers as the
/// bridge requires confirmations.
pub async fn submit_deposit_sweep_proof<C, B>(
    client: &C,
    bridge: &B,
    tx_hash: Txid,
    main_utxo: Option<Utxo>,
    vault: Option<ChainIdentifier>,
) -> ServiceResult<HostChainTxHash>
where
    C: BitcoinClient + ?Sized,
    B: Bridge + ?Sized,
{
    let ProvenTransaction { transaction, proof } = prove(client, bridge, tx_hash).await?;

    // the bridge expects a zeroed main UTXO when the sweep spent none
    let main_utxo = main_utxo.unwrap_or(Utxo::new(Txid::all_zeros(), 0, Amount::ZERO));

    let host_tx_hash = bridge
        .submit_deposit_sweep_proof(&transaction, &proof, &main_utxo, vault)
        .await?;
    info!(%tx_hash, %host_tx_hash, "submitted deposit sweep proof");

    Ok(host_tx_hash)
}

/// Proves the redemption `tx_hash` made by the wallet of `wallet_public_key` from its
/// `main_utxo` to the bridge.
pub async fn submit_redemption_proof<C, B>(
    client: &C,
    bridge: &B,
    tx_hash: Txid,
    main_utxo: Utxo,
    wallet_public_key: &PublicKey,
) -> ServiceResult<HostChainTxHash>
where
    C: BitcoinClient + ?Sized,
    B: Bridge + ?Sized,
{
    let ProvenTransaction { transaction, proof } = prove(client, bridge, tx_hash).await?;

    let host_tx_hash = bridge
        .submit_redemption_proof(&transaction, &proof, &main_utxo, wallet_public_key)
        .await?;
    info!(%tx_hash, %host_tx_hash, "submitted redemption proof");

    Ok(host_tx_hash)
}

/// The redemption request of `kind` made to the wallet of `wallet_public_key_hash` for
/// `redeemer_address`.
pub async fn find_redemption_request<B>(
    bridge: &B,
    redeemer_address: &str,
    network: BitcoinNetwork,
    wallet_public_key_hash: [u8; 20],
    kind: RedemptionRequestKind,
) -> ServiceResult<RedemptionRequest>
where
    B: Bridge + ?Sized,
{
    let redeemer_output_script = address_to_output_script(redeemer_address, network)?;

    redemption_request(bridge, wallet_public_key_hash, &redeemer_output_script, kind).await
}

async fn redemption_request<B>(
    bridge: &B,
    wallet_public_key_hash: [u8; 20],
    redeemer_output_script: &Script,
    kind: RedemptionRequestKind,
) -> ServiceResult<RedemptionRequest>
where
    B: Bridge + ?Sized,
{
    let request = match kind {
        RedemptionRequestKind::Pending => {
            bridge
                .pending_redemptions(wallet_public_key_hash, redeemer_output_script)
                .await?
        }
        RedemptionRequestKind::TimedOut => {
            bridge
                .timed_out_redemptions(wallet_public_key_hash, redeemer_output_script)
                .await?
        }
    };

    if !request.exists() {
        return Err(ServiceError::RedemptionRequestNotFound {
            redeemer_output_script: redeemer_output_script.to_owned(),
            kind,
        });
    }

    Ok(request)
}

async fn prove<C, B>(client: &C, bridge: &B, tx_hash: Txid) -> ServiceResult<ProvenTransaction>
where
    C: BitcoinClient + ?Sized,
    B: Bridge + ?Sized,
{
    let required_confirmations = bridge.tx_proof_difficulty_factor().await?;
    debug!(%tx_hash, %required_confirmations, "assembling proof");

    Ok(assemble_spv_proof(client, tx_hash, required_confirmations).await?)
}

#[cfg(test)]
mod tests {
    use bitcoin::consensus::encode::serialize_hex;
    use tbtc_bridge_primitives::{
        codec::DecomposedRawTransaction,
        types::{DepositRequest, SpvProof},
    };
    use tbtc_bridge_spv::{errors::SpvError, merkle::create_merkle_proof};
    use tbtc_bridge_test_utils::{
        bitcoin_client::InMemoryBitcoinClient,
        bridge::{InMemoryBridge, Submission},
        generators::generate_chain_identifier,
        proofs::ONE_EPOCH,
        transactions::{
            receipt, signing_key, utxo_with_tx, LEGACY_SWEEP_DEPOSIT_TX, LEGACY_SWEEP_TX,
            P2PKH_REDEMPTION_TX, REDEMPTION_MAIN_UTXO_TX, WALLET_WIF,
        },
    };

    use super::*;

    const WALLET_PKH: [u8; 20] = [
        0x8d, 0xb5, 0x0e, 0xb5, 0x20, 0x63, 0xea, 0x9d, 0x98, 0xb3, 0xea, 0xc9, 0x14, 0x89, 0xa9,
        0x0f, 0x73, 0x89, 0x86, 0xf6,
    ];

    /// P2PKH script of the redeemer address `mmTeMR8RKu6QzMGTG4ipA71uewm3EuJng5`.
    const REDEEMER_SCRIPT: &str = "76a9144130879211c54df460e484ddf9aac009cb38ee7488ac";

    fn redeemer_script() -> ScriptBuf {
        ScriptBuf::from_hex(REDEEMER_SCRIPT).expect("must be valid hex")
    }

    fn redemption(requested_at: u32) -> RedemptionRequest {
        RedemptionRequest {
            redeemer: ChainIdentifier::new([0x11; 20]),
            redeemer_output_script: redeemer_script(),
            requested_amount: Amount::from_sat(10_000),
            treasury_fee: Amount::ZERO,
            tx_max_fee: Amount::from_sat(1_600),
            requested_at,
        }
    }

    fn deposit_request(amount: Amount, swept_at: u32) -> DepositRequest {
        DepositRequest {
            depositor: ChainIdentifier::new([0x11; 20]),
            amount,
            vault: None,
            revealed_at: 1_653_302_600,
            swept_at,
            treasury_fee: Amount::ZERO,
        }
    }

    async fn sweep_legacy_deposit(
        client: &InMemoryBitcoinClient,
        bridge: &InMemoryBridge,
        deposit: Utxo,
    ) -> ServiceResult<DepositSweep> {
        submit_deposit_sweep(
            client,
            bridge,
            BitcoinNetwork::Testnet,
            Amount::from_sat(1_600),
            &signing_key(WALLET_WIF),
            false,
            &[deposit],
            &[receipt(
                "8db50eb52063ea9d98b3eac91489a90f738986f6",
                "e257eccafbc07c381642ce6e7e55120fb077fbed",
                1_653_302_600,
                2_592_000,
            )],
            None,
        )
        .await
    }

    #[tokio::test]
    async fn test_submit_deposit_sweep() {
        let client = InMemoryBitcoinClient::new(BitcoinNetwork::Testnet);
        let deposit = utxo_with_tx(LEGACY_SWEEP_DEPOSIT_TX, 0);
        client.add_transaction(deposit.transaction);

        let bridge = InMemoryBridge::new(6);
        bridge.set_deposit(
            deposit.utxo.outpoint,
            deposit_request(deposit.utxo.value, 0),
        );

        let sweep = sweep_legacy_deposit(&client, &bridge, deposit.utxo)
            .await
            .expect("must sweep");

        assert_eq!(
            sweep.txid().to_string(),
            "1c42b0568d88bb4d21ae138769fd06199dd3ec689911972792e678be8516d58d"
        );
        let broadcasts = client.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(serialize_hex(&broadcasts[0]), LEGACY_SWEEP_TX);
    }

    #[tokio::test]
    async fn test_submit_deposit_sweep_of_unrevealed_deposit() {
        let client = InMemoryBitcoinClient::new(BitcoinNetwork::Testnet);
        let deposit = utxo_with_tx(LEGACY_SWEEP_DEPOSIT_TX, 0);
        client.add_transaction(deposit.transaction);

        let bridge = InMemoryBridge::new(6);

        let err = sweep_legacy_deposit(&client, &bridge, deposit.utxo)
            .await
            .expect_err("bridge does not know the deposit");

        assert!(matches!(
            err,
            ServiceError::DepositNotRevealed(outpoint) if outpoint == deposit.utxo.outpoint
        ));
        assert!(client.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn test_submit_deposit_sweep_of_swept_deposit() {
        let client = InMemoryBitcoinClient::new(BitcoinNetwork::Testnet);
        let deposit = utxo_with_tx(LEGACY_SWEEP_DEPOSIT_TX, 0);
        client.add_transaction(deposit.transaction);

        let bridge = InMemoryBridge::new(6);
        bridge.set_deposit(
            deposit.utxo.outpoint,
            deposit_request(deposit.utxo.value, 1_653_310_000),
        );

        let err = sweep_legacy_deposit(&client, &bridge, deposit.utxo)
            .await
            .expect_err("deposit is already swept");

        assert!(matches!(
            err,
            ServiceError::DepositAlreadySwept(outpoint) if outpoint == deposit.utxo.outpoint
        ));
        assert!(client.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn test_submit_redemption() {
        let client = InMemoryBitcoinClient::new(BitcoinNetwork::Testnet);
        let main_utxo = utxo_with_tx(REDEMPTION_MAIN_UTXO_TX, 1);
        client.add_transaction(main_utxo.transaction);

        let bridge = InMemoryBridge::new(6);
        bridge.set_pending_redemption(WALLET_PKH, redemption(1_650_000_000));

        let redemption = submit_redemption(
            &client,
            &bridge,
            BitcoinNetwork::Testnet,
            &signing_key(WALLET_WIF),
            main_utxo.utxo,
            &[redeemer_script()],
            true,
        )
        .await
        .expect("must redeem");

        assert_eq!(
            redemption.txid().to_string(),
            "67f19c3c33a0735f64786afdf3627a9ae8b17af3fc691759abb5a88a9472c234"
        );
        let broadcasts = client.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(serialize_hex(&broadcasts[0]), P2PKH_REDEMPTION_TX);
    }

    #[tokio::test]
    async fn test_submit_redemption_for_unknown_request() {
        let client = InMemoryBitcoinClient::new(BitcoinNetwork::Testnet);
        let main_utxo = utxo_with_tx(REDEMPTION_MAIN_UTXO_TX, 1);
        client.add_transaction(main_utxo.transaction);

        // a timed out request is not a pending one
        let bridge = InMemoryBridge::new(6);
        bridge.set_timed_out_redemption(WALLET_PKH, redemption(1_650_000_000));

        let err = submit_redemption(
            &client,
            &bridge,
            BitcoinNetwork::Testnet,
            &signing_key(WALLET_WIF),
            main_utxo.utxo,
            &[redeemer_script()],
            true,
        )
        .await
        .expect_err("no pending request");

        assert!(matches!(
            err,
            ServiceError::RedemptionRequestNotFound {
                kind: RedemptionRequestKind::Pending,
                ..
            }
        ));
        assert!(client.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn test_find_redemption_request() {
        let bridge = InMemoryBridge::new(6);
        bridge.set_pending_redemption(WALLET_PKH, redemption(1_650_000_000));
        let address = "mmTeMR8RKu6QzMGTG4ipA71uewm3EuJng5";

        let request = find_redemption_request(
            &bridge,
            address,
            BitcoinNetwork::Testnet,
            WALLET_PKH,
            RedemptionRequestKind::Pending,
        )
        .await
        .expect("must find the request");
        assert_eq!(request, redemption(1_650_000_000));

        let err = find_redemption_request(
            &bridge,
            address,
            BitcoinNetwork::Testnet,
            WALLET_PKH,
            RedemptionRequestKind::TimedOut,
        )
        .await
        .expect_err("request did not time out");
        assert!(matches!(
            err,
            ServiceError::RedemptionRequestNotFound {
                kind: RedemptionRequestKind::TimedOut,
                ..
            }
        ));

        let err = find_redemption_request(
            &bridge,
            address,
            BitcoinNetwork::Mainnet,
            WALLET_PKH,
            RedemptionRequestKind::Pending,
        )
        .await
        .expect_err("testnet address on mainnet");
        assert!(matches!(err, ServiceError::Primitives(_)));
    }

    fn expected_proof() -> (DecomposedRawTransaction, SpvProof) {
        (
            DecomposedRawTransaction::from_transaction(&ONE_EPOCH.transaction()),
            SpvProof {
                merkle_proof: create_merkle_proof(&ONE_EPOCH.merkle_branch()),
                tx_index_in_block: ONE_EPOCH.position,
                bitcoin_headers: ONE_EPOCH.headers(),
            },
        )
    }

    #[tokio::test]
    async fn test_submit_deposit_sweep_proof() {
        let client = ONE_EPOCH.client();
        let bridge = InMemoryBridge::new(6);
        let vault = generate_chain_identifier();

        submit_deposit_sweep_proof(&client, &bridge, ONE_EPOCH.tx_hash(), None, Some(vault))
            .await
            .expect("must submit the proof");

        let (sweep_tx, proof) = expected_proof();
        assert_eq!(
            bridge.submissions(),
            [Submission::DepositSweepProof {
                sweep_tx,
                proof,
                main_utxo: Utxo::new(Txid::all_zeros(), 0, Amount::ZERO),
                vault: Some(vault),
            }]
        );
        assert_eq!(client.headers_chain_requests(), [(776_166, 5)]);
    }

    #[tokio::test]
    async fn test_submit_redemption_proof() {
        let client = ONE_EPOCH.client();
        let bridge = InMemoryBridge::new(6);
        let main_utxo = utxo_with_tx(REDEMPTION_MAIN_UTXO_TX, 1).utxo;
        let wallet_public_key = *signing_key(WALLET_WIF).public_key();

        submit_redemption_proof(
            &client,
            &bridge,
            ONE_EPOCH.tx_hash(),
            main_utxo,
            &wallet_public_key,
        )
        .await
        .expect("must submit the proof");

        let (redemption_tx, proof) = expected_proof();
        assert_eq!(
            bridge.submissions(),
            [Submission::RedemptionProof {
                redemption_tx,
                proof,
                main_utxo,
                wallet_public_key,
            }]
        );
    }

    #[tokio::test]
    async fn test_proof_follows_bridge_difficulty_factor() {
        // the transaction has 1798 confirmations
        let client = ONE_EPOCH.client();
        let bridge = InMemoryBridge::new(2_000);

        let err = submit_deposit_sweep_proof(&client, &bridge, ONE_EPOCH.tx_hash(), None, None)
            .await
            .expect_err("not enough confirmations");

        assert!(matches!(
            err,
            ServiceError::Spv(SpvError::InsufficientConfirmations {
                confirmations: 1_798,
                required: 2_000,
            })
        ));
        assert!(bridge.submissions().is_empty());
    }
}
