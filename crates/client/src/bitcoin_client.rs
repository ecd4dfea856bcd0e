//! The query contract of a remote Bitcoin data source, such as an Electrum server.

use async_trait::async_trait;
use bitcoin::{Address, Transaction, Txid};
use tbtc_bridge_primitives::{
    network::BitcoinNetwork,
    types::{TxMerkleBranch, Utxo},
};

use crate::errors::ClientResult;

/// Default number of most recent transactions inspected per wallet address when looking for a
/// wallet's main UTXO.
pub const DEFAULT_HISTORY_DEPTH: usize = 5;

/// Read and broadcast access to the Bitcoin network.
///
/// Implementations own their timeouts; nothing in this workspace imposes one.
#[async_trait]
pub trait BitcoinClient: Send + Sync {
    /// The network the data source is connected to.
    async fn get_network(&self) -> ClientResult<BitcoinNetwork>;

    /// Every unspent output locked to `address`, confirmed or not.
    async fn find_all_unspent_transaction_outputs(&self, address: &Address)
        -> ClientResult<Vec<Utxo>>;

    /// Confirmed transactions touching `address`, ordered from the oldest to the newest.
    ///
    /// When `limit` is set only the last `limit` transactions are returned.
    async fn get_transaction_history(
        &self,
        address: &Address,
        limit: Option<usize>,
    ) -> ClientResult<Vec<Transaction>>;

    /// The transaction with the given id.
    async fn get_transaction(&self, txid: Txid) -> ClientResult<Transaction>;

    /// The consensus serialization of the transaction with the given id.
    async fn get_raw_transaction(&self, txid: Txid) -> ClientResult<Vec<u8>>;

    /// Number of blocks that confirm the transaction, zero when it is unconfirmed.
    async fn get_transaction_confirmations(&self, txid: Txid) -> ClientResult<u32>;

    /// Height of the chain tip.
    async fn latest_block_height(&self) -> ClientResult<u64>;

    /// Concatenated 80-byte headers from `height` to `height + chain_length`, both inclusive.
    async fn get_headers_chain(&self, height: u64, chain_length: u64) -> ClientResult<Vec<u8>>;

    /// The Merkle branch of a transaction included in the block at `block_height`.
    async fn get_transaction_merkle(
        &self,
        txid: Txid,
        block_height: u64,
    ) -> ClientResult<TxMerkleBranch>;

    /// Broadcasts a signed transaction.
    ///
    /// A successful return only means the data source accepted the request. The transaction may
    /// still be dropped without being mined.
    async fn broadcast(&self, transaction: &Transaction) -> ClientResult<()>;
}
