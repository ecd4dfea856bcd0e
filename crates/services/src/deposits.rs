//! Depositor-side flows: funding a deposit, revealing it to the bridge and refunding it.

use bitcoin::{Address, Amount, OutPoint};
use tbtc_bridge_client::{bitcoin_client::BitcoinClient, bridge::Bridge};
use tbtc_bridge_primitives::{
    address::{parse_address, public_key_hash_to_address},
    codec::DecomposedRawTransaction,
    deposit::{calculate_refund_locktime, DepositReceipt},
    key::{parse_public_key, public_key_hash, SigningKey},
    network::BitcoinNetwork,
    types::{ChainIdentifier, HostChainTxHash, Utxo},
};
use tbtc_bridge_tx_builder::{
    funding::{assemble_deposit_funding, DepositFunding},
    refund::{assemble_deposit_refund, DepositRefund},
};
use tracing::{debug, info};

use crate::{
    errors::{ServiceError, ServiceResult},
    fetch::{ensure_network, utxo_with_tx, utxos_with_txs},
};

/// Builds a fresh receipt for a deposit into the wallet the bridge currently accepts deposits
/// for.
///
/// The blinding factor is random and the refund locktime is `created_at +
/// refund_locktime_duration`. `refund_public_key` must be a compressed public key.
pub async fn generate_deposit_receipt<B>(
    bridge: &B,
    depositor: ChainIdentifier,
    refund_public_key: &[u8],
    created_at: u32,
    refund_locktime_duration: u32,
) -> ServiceResult<DepositReceipt>
where
    B: Bridge + ?Sized,
{
    let wallet_public_key_hash = bridge
        .active_wallet_public_key_hash()
        .await?
        .ok_or(ServiceError::NoActiveWallet)?;
    let refund_public_key_hash = public_key_hash(&parse_public_key(refund_public_key)?)?;
    let refund_locktime = calculate_refund_locktime(created_at, refund_locktime_duration)?;

    Ok(DepositReceipt {
        depositor,
        blinding_factor: rand::random(),
        wallet_public_key_hash,
        refund_public_key_hash,
        refund_locktime,
        vault: None,
        extra_data: None,
    })
}

/// The address a deposit described by `receipt` must be sent to.
///
/// P2WSH when `witness` is set, P2SH otherwise.
pub fn derive_deposit_address(
    receipt: &DepositReceipt,
    witness: bool,
    network: BitcoinNetwork,
) -> ServiceResult<Address> {
    Ok(receipt.address(witness, network)?)
}

/// Lists the outputs that currently fund the deposit address of `receipt`.
pub async fn detect_funding<C>(
    client: &C,
    receipt: &DepositReceipt,
    witness: bool,
    network: BitcoinNetwork,
) -> ServiceResult<Vec<Utxo>>
where
    C: BitcoinClient + ?Sized,
{
    ensure_network(client, network).await?;

    let address = derive_deposit_address(receipt, witness, network)?;
    let utxos = client.find_all_unspent_transaction_outputs(&address).await?;
    debug!(%address, count = utxos.len(), "detected deposit funding");

    Ok(utxos)
}

/// Funds the deposit described by `receipt` with `amount` from the P2WPKH outputs of
/// `depositor_key`, and broadcasts the transaction.
pub async fn submit_deposit_funding<C>(
    client: &C,
    network: BitcoinNetwork,
    receipt: &DepositReceipt,
    amount: Amount,
    fee: Amount,
    depositor_key: &SigningKey,
    witness: bool,
) -> ServiceResult<DepositFunding>
where
    C: BitcoinClient + ?Sized,
{
    ensure_network(client, network).await?;

    let depositor_address =
        public_key_hash_to_address(&depositor_key.public_key_hash()?, true, network)?;
    let utxos = client
        .find_all_unspent_transaction_outputs(&depositor_address)
        .await?;
    debug!(%depositor_address, count = utxos.len(), "found depositor outputs");

    let inputs = utxos_with_txs(client, &utxos).await?;
    let funding = assemble_deposit_funding(receipt, amount, fee, &inputs, depositor_key, witness)?;

    client.broadcast(&funding.transaction).await?;
    info!(txid = %funding.txid(), %amount, "broadcast deposit funding");

    Ok(funding)
}

/// Reveals the deposit funded by `deposit_outpoint` to the bridge.
///
/// Minted tokens go to `vault` when set, and to the vault of `receipt` otherwise. Deposits the
/// bridge already knows are rejected before anything is submitted.
pub async fn reveal_deposit<C, B>(
    client: &C,
    bridge: &B,
    deposit_outpoint: OutPoint,
    receipt: &DepositReceipt,
    vault: Option<ChainIdentifier>,
) -> ServiceResult<HostChainTxHash>
where
    C: BitcoinClient + ?Sized,
    B: Bridge + ?Sized,
{
    if bridge.deposits(deposit_outpoint).await?.is_revealed() {
        return Err(ServiceError::DepositAlreadyRevealed(deposit_outpoint));
    }

    let raw_transaction = client.get_raw_transaction(deposit_outpoint.txid).await?;
    let deposit_tx = DecomposedRawTransaction::from_raw(&raw_transaction)?;

    let tx_hash = bridge
        .reveal_deposit(
            &deposit_tx,
            deposit_outpoint.vout,
            receipt,
            vault.or(receipt.vault),
        )
        .await?;
    info!(%deposit_outpoint, %tx_hash, "revealed deposit");

    Ok(tx_hash)
}

/// Takes the deposit `utxo` back to `refunder_address` once its refund locktime has passed, and
/// broadcasts the transaction.
///
/// The transaction is rejected by the network until the median time past of the chain reaches
/// the refund locktime of `receipt`.
pub async fn submit_deposit_refund<C>(
    client: &C,
    network: BitcoinNetwork,
    fee: Amount,
    utxo: Utxo,
    receipt: &DepositReceipt,
    refunder_address: &str,
    refunder_key: &SigningKey,
) -> ServiceResult<DepositRefund>
where
    C: BitcoinClient + ?Sized,
{
    ensure_network(client, network).await?;

    let refunder_address = parse_address(refunder_address, network)?;
    let deposit = utxo_with_tx(client, utxo).await?;
    let refund = assemble_deposit_refund(fee, &deposit, receipt, &refunder_address, refunder_key)?;

    client.broadcast(&refund.transaction).await?;
    info!(txid = %refund.txid(), deposit = %utxo.outpoint, "broadcast deposit refund");

    Ok(refund)
}
