//! Wrappers that apply a [`RetryPolicy`] to every call of a collaborator.

use async_trait::async_trait;
use bitcoin::{Address, Amount, OutPoint, PublicKey, Script, Transaction, Txid};
use tbtc_bridge_primitives::{
    codec::DecomposedRawTransaction,
    deposit::DepositReceipt,
    network::BitcoinNetwork,
    types::{
        ChainIdentifier, DepositRequest, HostChainTxHash, RedemptionRequest, SpvProof,
        TxMerkleBranch, Utxo, Wallet,
    },
};

use crate::{
    bitcoin_client::BitcoinClient,
    bridge::Bridge,
    errors::{ClientError, ClientResult},
    retry::{retry_with, RetryPolicy},
};

/// A [`Bridge`] whose calls are retried according to a [`RetryPolicy`].
///
/// Errors flagged by [`ClientError::is_permanent`], such as revealing a deposit twice, are returned
/// right away.
#[derive(Debug, Clone)]
pub struct RetryingBridge<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B> RetryingBridge<B> {
    /// Wraps `inner` with `policy`.
    pub const fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped bridge.
    pub const fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: Bridge> Bridge for RetryingBridge<B> {
    async fn reveal_deposit(
        &self,
        deposit_tx: &DecomposedRawTransaction,
        deposit_output_index: u32,
        receipt: &DepositReceipt,
        vault: Option<ChainIdentifier>,
    ) -> ClientResult<HostChainTxHash> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.reveal_deposit(deposit_tx, deposit_output_index, receipt, vault)
        })
        .await
    }

    async fn submit_deposit_sweep_proof(
        &self,
        sweep_tx: &DecomposedRawTransaction,
        sweep_proof: &SpvProof,
        main_utxo: &Utxo,
        vault: Option<ChainIdentifier>,
    ) -> ClientResult<HostChainTxHash> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.submit_deposit_sweep_proof(sweep_tx, sweep_proof, main_utxo, vault)
        })
        .await
    }

    async fn request_redemption(
        &self,
        wallet_public_key: &PublicKey,
        main_utxo: &Utxo,
        redeemer_output_script: &Script,
        amount: Amount,
    ) -> ClientResult<HostChainTxHash> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.request_redemption(wallet_public_key, main_utxo, redeemer_output_script, amount)
        })
        .await
    }

    async fn submit_redemption_proof(
        &self,
        redemption_tx: &DecomposedRawTransaction,
        redemption_proof: &SpvProof,
        main_utxo: &Utxo,
        wallet_public_key: &PublicKey,
    ) -> ClientResult<HostChainTxHash> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.submit_redemption_proof(
                redemption_tx,
                redemption_proof,
                main_utxo,
                wallet_public_key,
            )
        })
        .await
    }

    async fn pending_redemptions(
        &self,
        wallet_public_key_hash: [u8; 20],
        redeemer_output_script: &Script,
    ) -> ClientResult<RedemptionRequest> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.pending_redemptions(wallet_public_key_hash, redeemer_output_script)
        })
        .await
    }

    async fn timed_out_redemptions(
        &self,
        wallet_public_key_hash: [u8; 20],
        redeemer_output_script: &Script,
    ) -> ClientResult<RedemptionRequest> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.timed_out_redemptions(wallet_public_key_hash, redeemer_output_script)
        })
        .await
    }

    async fn deposits(&self, deposit_outpoint: OutPoint) -> ClientResult<DepositRequest> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.deposits(deposit_outpoint)
        })
        .await
    }

    async fn active_wallet_public_key_hash(&self) -> ClientResult<Option<[u8; 20]>> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.active_wallet_public_key_hash()
        })
        .await
    }

    async fn wallets(&self, wallet_public_key_hash: [u8; 20]) -> ClientResult<Wallet> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.wallets(wallet_public_key_hash)
        })
        .await
    }

    async fn tx_proof_difficulty_factor(&self) -> ClientResult<u32> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.tx_proof_difficulty_factor()
        })
        .await
    }

    fn build_utxo_hash(&self, utxo: &Utxo) -> [u8; 32] {
        self.inner.build_utxo_hash(utxo)
    }
}

/// A [`BitcoinClient`] whose reads are retried according to a [`RetryPolicy`].
///
/// Broadcasts are passed through untouched.
#[derive(Debug, Clone)]
pub struct RetryingBitcoinClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> RetryingBitcoinClient<C> {
    /// Wraps `inner` with `policy`.
    pub const fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped client.
    pub const fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: BitcoinClient> BitcoinClient for RetryingBitcoinClient<C> {
    async fn get_network(&self) -> ClientResult<BitcoinNetwork> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.get_network()
        })
        .await
    }

    async fn find_all_unspent_transaction_outputs(
        &self,
        address: &Address,
    ) -> ClientResult<Vec<Utxo>> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.find_all_unspent_transaction_outputs(address)
        })
        .await
    }

    async fn get_transaction_history(
        &self,
        address: &Address,
        limit: Option<usize>,
    ) -> ClientResult<Vec<Transaction>> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.get_transaction_history(address, limit)
        })
        .await
    }

    async fn get_transaction(&self, txid: Txid) -> ClientResult<Transaction> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.get_transaction(txid)
        })
        .await
    }

    async fn get_raw_transaction(&self, txid: Txid) -> ClientResult<Vec<u8>> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.get_raw_transaction(txid)
        })
        .await
    }

    async fn get_transaction_confirmations(&self, txid: Txid) -> ClientResult<u32> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.get_transaction_confirmations(txid)
        })
        .await
    }

    async fn latest_block_height(&self) -> ClientResult<u64> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.latest_block_height()
        })
        .await
    }

    async fn get_headers_chain(&self, height: u64, chain_length: u64) -> ClientResult<Vec<u8>> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.get_headers_chain(height, chain_length)
        })
        .await
    }

    async fn get_transaction_merkle(
        &self,
        txid: Txid,
        block_height: u64,
    ) -> ClientResult<TxMerkleBranch> {
        let inner = &self.inner;
        retry_with(&self.policy, ClientError::is_permanent, move || {
            inner.get_transaction_merkle(txid, block_height)
        })
        .await
    }

    async fn broadcast(&self, transaction: &Transaction) -> ClientResult<()> {
        self.inner.broadcast(transaction).await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use bitcoin::hashes::Hash;
    use tbtc_bridge_primitives::types::WalletState;

    use super::*;
    use crate::errors::DEPOSIT_ALREADY_REVEALED;

    /// A bridge that fails a fixed number of times before answering, counting every call.
    #[derive(Debug, Default)]
    struct FlakyBridge {
        failures: usize,
        calls: AtomicUsize,
        revert_reason: Option<&'static str>,
    }

    impl FlakyBridge {
        fn fail(&self) -> ClientResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(reason) = self.revert_reason {
                return Err(ClientError::Reverted {
                    reason: reason.to_string(),
                });
            }

            if call < self.failures {
                return Err(ClientError::Request("connection reset".to_string()));
            }

            Ok(())
        }
    }

    #[async_trait]
    impl Bridge for FlakyBridge {
        async fn reveal_deposit(
            &self,
            _deposit_tx: &DecomposedRawTransaction,
            _deposit_output_index: u32,
            _receipt: &DepositReceipt,
            _vault: Option<ChainIdentifier>,
        ) -> ClientResult<HostChainTxHash> {
            self.fail()?;
            Ok(HostChainTxHash::new([1; 32]))
        }

        async fn submit_deposit_sweep_proof(
            &self,
            _sweep_tx: &DecomposedRawTransaction,
            _sweep_proof: &SpvProof,
            _main_utxo: &Utxo,
            _vault: Option<ChainIdentifier>,
        ) -> ClientResult<HostChainTxHash> {
            self.fail()?;
            Ok(HostChainTxHash::new([2; 32]))
        }

        async fn request_redemption(
            &self,
            _wallet_public_key: &PublicKey,
            _main_utxo: &Utxo,
            _redeemer_output_script: &Script,
            _amount: Amount,
        ) -> ClientResult<HostChainTxHash> {
            self.fail()?;
            Ok(HostChainTxHash::new([3; 32]))
        }

        async fn submit_redemption_proof(
            &self,
            _redemption_tx: &DecomposedRawTransaction,
            _redemption_proof: &SpvProof,
            _main_utxo: &Utxo,
            _wallet_public_key: &PublicKey,
        ) -> ClientResult<HostChainTxHash> {
            self.fail()?;
            Ok(HostChainTxHash::new([4; 32]))
        }

        async fn pending_redemptions(
            &self,
            _wallet_public_key_hash: [u8; 20],
            _redeemer_output_script: &Script,
        ) -> ClientResult<RedemptionRequest> {
            unimplemented!("not used in these tests")
        }

        async fn timed_out_redemptions(
            &self,
            _wallet_public_key_hash: [u8; 20],
            _redeemer_output_script: &Script,
        ) -> ClientResult<RedemptionRequest> {
            unimplemented!("not used in these tests")
        }

        async fn deposits(&self, _deposit_outpoint: OutPoint) -> ClientResult<DepositRequest> {
            unimplemented!("not used in these tests")
        }

        async fn active_wallet_public_key_hash(&self) -> ClientResult<Option<[u8; 20]>> {
            self.fail()?;
            Ok(None)
        }

        async fn wallets(&self, _wallet_public_key_hash: [u8; 20]) -> ClientResult<Wallet> {
            self.fail()?;
            Ok(Wallet {
                main_utxo_hash: [0; 32],
                pending_redemptions_value: Amount::ZERO,
                created_at: 0,
                state: WalletState::Live,
            })
        }

        async fn tx_proof_difficulty_factor(&self) -> ClientResult<u32> {
            self.fail()?;
            Ok(6)
        }
    }

    const FAST: RetryPolicy = RetryPolicy::new(2, Duration::from_millis(1), Duration::ZERO);

    fn decomposed() -> DecomposedRawTransaction {
        DecomposedRawTransaction {
            version: [1, 0, 0, 0],
            inputs: vec![0],
            outputs: vec![0],
            locktime: [0; 4],
        }
    }

    fn receipt() -> DepositReceipt {
        DepositReceipt::from_hex(
            "934b98637ca318a4d6e7ca6ffd1690b8e77df637",
            "f9f0c90d00039523",
            "8db50eb52063ea9d98b3eac91489a90f738986f6",
            "28e081f285138ccbe389c1eb8985716230129f89",
            "60bcea61",
        )
        .expect("must be valid")
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let bridge = RetryingBridge::new(
            FlakyBridge {
                failures: 2,
                ..Default::default()
            },
            FAST,
        );

        let factor = bridge
            .tx_proof_difficulty_factor()
            .await
            .expect("third attempt must succeed");

        assert_eq!(factor, 6);
        assert_eq!(bridge.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let bridge = RetryingBridge::new(
            FlakyBridge {
                failures: 10,
                ..Default::default()
            },
            FAST,
        );

        let result = bridge.wallets([0; 20]).await;

        assert!(matches!(result, Err(ClientError::Request(_))));
        assert_eq!(
            bridge.inner().calls.load(Ordering::SeqCst),
            FAST.max_retries + 1
        );
    }

    #[tokio::test]
    async fn test_already_revealed_deposit_is_not_retried() {
        let bridge = RetryingBridge::new(
            FlakyBridge {
                revert_reason: Some(DEPOSIT_ALREADY_REVEALED),
                ..Default::default()
            },
            FAST,
        );

        let result = bridge
            .reveal_deposit(&decomposed(), 0, &receipt(), None)
            .await;

        assert!(matches!(result, Err(ClientError::Reverted { .. })));
        assert_eq!(bridge.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_reverts_are_retried() {
        let bridge = RetryingBridge::new(
            FlakyBridge {
                revert_reason: Some("Wallet must be in Live state"),
                ..Default::default()
            },
            FAST,
        );

        let txid = Txid::from_str("ea374ab6842723c647c3fc0ab281ca0641eaa768576cf9df695ca5b827140214")
            .expect("must be valid txid");
        let main_utxo = Utxo::new(txid, 1, Amount::from_sat(200_000));
        let proof = SpvProof {
            merkle_proof: vec![],
            tx_index_in_block: 0,
            bitcoin_headers: vec![],
        };

        let result = bridge
            .submit_deposit_sweep_proof(&decomposed(), &proof, &main_utxo, None)
            .await;

        assert!(result.is_err());
        assert_eq!(
            bridge.inner().calls.load(Ordering::SeqCst),
            FAST.max_retries + 1
        );
    }

    #[test]
    fn test_utxo_hash_is_delegated() {
        let bridge = RetryingBridge::new(FlakyBridge::default(), FAST);
        let utxo = Utxo::new(Txid::all_zeros(), 0, Amount::from_sat(1));

        assert_eq!(
            bridge.build_utxo_hash(&utxo),
            crate::bridge::build_main_utxo_hash(&utxo)
        );
    }
}
