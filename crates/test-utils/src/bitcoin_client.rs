//! An in-memory [`BitcoinClient`] whose chain state is set up by the test.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use bitcoin::{consensus, Address, ScriptBuf, Transaction, Txid};
use tbtc_bridge_client::{
    bitcoin_client::BitcoinClient,
    errors::{ClientError, ClientResult},
};
use tbtc_bridge_primitives::{
    network::BitcoinNetwork,
    types::{TxMerkleBranch, Utxo},
};

#[derive(Debug)]
struct ChainState {
    network: BitcoinNetwork,
    unspent_outputs: HashMap<ScriptBuf, Vec<Utxo>>,
    history: HashMap<ScriptBuf, Vec<Transaction>>,
    transactions: HashMap<Txid, Transaction>,
    confirmations: HashMap<Txid, u32>,
    latest_block_height: u64,
    headers_chain: Vec<u8>,
    merkle_branches: HashMap<Txid, TxMerkleBranch>,
    headers_chain_requests: Vec<(u64, u64)>,
    broadcasts: Vec<Transaction>,
}

/// A [`BitcoinClient`] backed by maps the test fills in.
///
/// Clones share the same state, so a test can keep a handle to inspect broadcasts after passing
/// the client to the code under test.
#[derive(Debug, Clone)]
pub struct InMemoryBitcoinClient {
    state: Arc<RwLock<ChainState>>,
}

impl InMemoryBitcoinClient {
    /// Creates an empty chain on `network`.
    pub fn new(network: BitcoinNetwork) -> Self {
        Self {
            state: Arc::new(RwLock::new(ChainState {
                network,
                unspent_outputs: HashMap::new(),
                history: HashMap::new(),
                transactions: HashMap::new(),
                confirmations: HashMap::new(),
                latest_block_height: 0,
                headers_chain: Vec::new(),
                merkle_branches: HashMap::new(),
                headers_chain_requests: Vec::new(),
                broadcasts: Vec::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state.read().expect("chain state lock must not be poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChainState> {
        self.state
            .write()
            .expect("chain state lock must not be poisoned")
    }

    /// Makes `transaction` retrievable by its txid.
    pub fn add_transaction(&self, transaction: Transaction) {
        self.write()
            .transactions
            .insert(transaction.compute_txid(), transaction);
    }

    /// Sets the unspent outputs locked to `address`.
    pub fn set_unspent_outputs(&self, address: &Address, utxos: Vec<Utxo>) {
        self.write()
            .unspent_outputs
            .insert(address.script_pubkey(), utxos);
    }

    /// Sets the history of `address`, ordered from the oldest to the newest transaction.
    ///
    /// Every transaction of the history also becomes retrievable by its txid.
    pub fn set_history(&self, address: &Address, history: Vec<Transaction>) {
        let mut state = self.write();
        for transaction in &history {
            state
                .transactions
                .insert(transaction.compute_txid(), transaction.clone());
        }
        state.history.insert(address.script_pubkey(), history);
    }

    /// Sets the number of confirmations of a transaction.
    pub fn set_confirmations(&self, txid: Txid, confirmations: u32) {
        self.write().confirmations.insert(txid, confirmations);
    }

    /// Sets the height of the chain tip.
    pub fn set_latest_block_height(&self, height: u64) {
        self.write().latest_block_height = height;
    }

    /// Sets the headers returned by every [`BitcoinClient::get_headers_chain`] call.
    pub fn set_headers_chain(&self, headers_chain: Vec<u8>) {
        self.write().headers_chain = headers_chain;
    }

    /// Sets the Merkle branch of a transaction.
    pub fn set_transaction_merkle(&self, txid: Txid, branch: TxMerkleBranch) {
        self.write().merkle_branches.insert(txid, branch);
    }

    /// Every `(height, chain_length)` pair headers were requested with, in call order.
    pub fn headers_chain_requests(&self) -> Vec<(u64, u64)> {
        self.read().headers_chain_requests.clone()
    }

    /// Every broadcast transaction, in call order.
    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.read().broadcasts.clone()
    }

    fn transaction(&self, txid: Txid) -> ClientResult<Transaction> {
        self.read()
            .transactions
            .get(&txid)
            .cloned()
            .ok_or(ClientError::TransactionNotFound(txid))
    }
}

#[async_trait]
impl BitcoinClient for InMemoryBitcoinClient {
    async fn get_network(&self) -> ClientResult<BitcoinNetwork> {
        Ok(self.read().network)
    }

    async fn find_all_unspent_transaction_outputs(
        &self,
        address: &Address,
    ) -> ClientResult<Vec<Utxo>> {
        Ok(self
            .read()
            .unspent_outputs
            .get(&address.script_pubkey())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_transaction_history(
        &self,
        address: &Address,
        limit: Option<usize>,
    ) -> ClientResult<Vec<Transaction>> {
        let history = self
            .read()
            .history
            .get(&address.script_pubkey())
            .cloned()
            .unwrap_or_default();

        let skip = limit.map_or(0, |limit| history.len().saturating_sub(limit));

        Ok(history.into_iter().skip(skip).collect())
    }

    async fn get_transaction(&self, txid: Txid) -> ClientResult<Transaction> {
        self.transaction(txid)
    }

    async fn get_raw_transaction(&self, txid: Txid) -> ClientResult<Vec<u8>> {
        self.transaction(txid).map(|tx| consensus::serialize(&tx))
    }

    async fn get_transaction_confirmations(&self, txid: Txid) -> ClientResult<u32> {
        Ok(self
            .read()
            .confirmations
            .get(&txid)
            .copied()
            .unwrap_or_default())
    }

    async fn latest_block_height(&self) -> ClientResult<u64> {
        Ok(self.read().latest_block_height)
    }

    async fn get_headers_chain(&self, height: u64, chain_length: u64) -> ClientResult<Vec<u8>> {
        let mut state = self.write();
        state.headers_chain_requests.push((height, chain_length));

        Ok(state.headers_chain.clone())
    }

    async fn get_transaction_merkle(
        &self,
        txid: Txid,
        _block_height: u64,
    ) -> ClientResult<TxMerkleBranch> {
        self.read()
            .merkle_branches
            .get(&txid)
            .cloned()
            .ok_or(ClientError::TransactionNotFound(txid))
    }

    async fn broadcast(&self, transaction: &Transaction) -> ClientResult<()> {
        let mut state = self.write();
        state
            .transactions
            .insert(transaction.compute_txid(), transaction.clone());
        state.broadcasts.push(transaction.clone());

        Ok(())
    }
}
