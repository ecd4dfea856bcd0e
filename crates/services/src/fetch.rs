//! Lookups shared by the flows.

use tbtc_bridge_client::bitcoin_client::BitcoinClient;
use tbtc_bridge_primitives::{
    network::BitcoinNetwork,
    types::{Utxo, UtxoWithTx},
};
use tracing::trace;

use crate::errors::{ServiceError, ServiceResult};

/// Fails unless `client` works on `expected`.
pub(crate) async fn ensure_network<C>(client: &C, expected: BitcoinNetwork) -> ServiceResult<()>
where
    C: BitcoinClient + ?Sized,
{
    let actual = client.get_network().await?;
    if actual != expected {
        return Err(ServiceError::NetworkMismatch { expected, actual });
    }

    Ok(())
}

/// Pairs `utxo` with the transaction that created it.
pub(crate) async fn utxo_with_tx<C>(client: &C, utxo: Utxo) -> ServiceResult<UtxoWithTx>
where
    C: BitcoinClient + ?Sized,
{
    trace!(outpoint = %utxo.outpoint, "fetching parent transaction");
    let transaction = client.get_transaction(utxo.outpoint.txid).await?;

    Ok(UtxoWithTx { utxo, transaction })
}

/// Pairs every UTXO of `utxos` with the transaction that created it, keeping the order.
pub(crate) async fn utxos_with_txs<C>(client: &C, utxos: &[Utxo]) -> ServiceResult<Vec<UtxoWithTx>>
where
    C: BitcoinClient + ?Sized,
{
    let mut resolved = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        resolved.push(utxo_with_tx(client, *utxo).await?);
    }

    Ok(resolved)
}
