//! An in-memory [`Bridge`] that records every write it receives.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use bitcoin::{consensus, Amount, OutPoint, PublicKey, Script, ScriptBuf, Transaction, Txid};
use tbtc_bridge_client::{
    bridge::Bridge,
    errors::{ClientError, ClientResult, DEPOSIT_ALREADY_REVEALED},
};
use tbtc_bridge_primitives::{
    codec::DecomposedRawTransaction,
    deposit::DepositReceipt,
    types::{
        ChainIdentifier, DepositRequest, HostChainTxHash, RedemptionRequest, SpvProof, Utxo,
        Wallet, WalletState,
    },
};

/// A write call received by the [`InMemoryBridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A deposit reveal.
    RevealDeposit {
        /// The revealed funding transaction.
        deposit_tx: DecomposedRawTransaction,

        /// Index of the deposit output.
        deposit_output_index: u32,

        /// The revealed receipt.
        receipt: DepositReceipt,

        /// Vault the deposit is routed to.
        vault: Option<ChainIdentifier>,
    },

    /// A deposit sweep proof.
    DepositSweepProof {
        /// The proven sweep transaction.
        sweep_tx: DecomposedRawTransaction,

        /// Its inclusion proof.
        proof: SpvProof,

        /// The main UTXO the sweep spent, zeroed when it spent none.
        main_utxo: Utxo,

        /// Vault of the swept deposits.
        vault: Option<ChainIdentifier>,
    },

    /// A redemption request.
    RequestRedemption {
        /// Wallet asked to redeem.
        wallet_public_key: PublicKey,

        /// Main UTXO of the wallet.
        main_utxo: Utxo,

        /// Script the redeemed BTC goes to.
        redeemer_output_script: ScriptBuf,

        /// Requested amount.
        amount: Amount,
    },

    /// A redemption proof.
    RedemptionProof {
        /// The proven redemption transaction.
        redemption_tx: DecomposedRawTransaction,

        /// Its inclusion proof.
        proof: SpvProof,

        /// The main UTXO the redemption spent.
        main_utxo: Utxo,

        /// Wallet that performed the redemption.
        wallet_public_key: PublicKey,
    },
}

#[derive(Debug, Default)]
struct BridgeState {
    deposits: HashMap<OutPoint, DepositRequest>,
    wallets: HashMap<[u8; 20], Wallet>,
    pending_redemptions: HashMap<([u8; 20], ScriptBuf), RedemptionRequest>,
    timed_out_redemptions: HashMap<([u8; 20], ScriptBuf), RedemptionRequest>,
    active_wallet_public_key_hash: Option<[u8; 20]>,
    tx_proof_difficulty_factor: u32,
    submissions: Vec<Submission>,
}

impl BridgeState {
    fn submit(&mut self, submission: Submission) -> HostChainTxHash {
        self.submissions.push(submission);

        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&(self.submissions.len() as u64).to_be_bytes());
        HostChainTxHash::new(hash)
    }
}

/// A [`Bridge`] backed by maps the test fills in.
///
/// Revealing a deposit registers it, so a second reveal of the same outpoint reverts the way the
/// contract does. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBridge {
    state: Arc<RwLock<BridgeState>>,
}

impl InMemoryBridge {
    /// Creates a bridge that requires `tx_proof_difficulty_factor` confirmations for proofs.
    pub fn new(tx_proof_difficulty_factor: u32) -> Self {
        let bridge = Self::default();
        bridge.write().tx_proof_difficulty_factor = tx_proof_difficulty_factor;

        bridge
    }

    fn read(&self) -> RwLockReadGuard<'_, BridgeState> {
        self.state
            .read()
            .expect("bridge state lock must not be poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, BridgeState> {
        self.state
            .write()
            .expect("bridge state lock must not be poisoned")
    }

    /// Registers a wallet.
    pub fn set_wallet(&self, wallet_public_key_hash: [u8; 20], wallet: Wallet) {
        self.write().wallets.insert(wallet_public_key_hash, wallet);
    }

    /// Sets the wallet currently accepting deposits.
    pub fn set_active_wallet(&self, wallet_public_key_hash: Option<[u8; 20]>) {
        self.write().active_wallet_public_key_hash = wallet_public_key_hash;
    }

    /// Registers a pending redemption request.
    pub fn set_pending_redemption(
        &self,
        wallet_public_key_hash: [u8; 20],
        request: RedemptionRequest,
    ) {
        let key = (
            wallet_public_key_hash,
            request.redeemer_output_script.clone(),
        );
        self.write().pending_redemptions.insert(key, request);
    }

    /// Registers a timed out redemption request.
    pub fn set_timed_out_redemption(
        &self,
        wallet_public_key_hash: [u8; 20],
        request: RedemptionRequest,
    ) {
        let key = (
            wallet_public_key_hash,
            request.redeemer_output_script.clone(),
        );
        self.write().timed_out_redemptions.insert(key, request);
    }

    /// Registers a revealed deposit.
    pub fn set_deposit(&self, deposit_outpoint: OutPoint, deposit: DepositRequest) {
        self.write().deposits.insert(deposit_outpoint, deposit);
    }

    /// Every write call received so far, in call order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.read().submissions.clone()
    }
}

fn missing_redemption(redeemer_output_script: &Script) -> RedemptionRequest {
    RedemptionRequest {
        redeemer: ChainIdentifier::new([0u8; 20]),
        redeemer_output_script: redeemer_output_script.to_owned(),
        requested_amount: Amount::ZERO,
        treasury_fee: Amount::ZERO,
        tx_max_fee: Amount::ZERO,
        requested_at: 0,
    }
}

fn txid_and_value(
    deposit_tx: &DecomposedRawTransaction,
    output_index: u32,
) -> ClientResult<(Txid, Amount)> {
    let transaction: Transaction = consensus::deserialize(&deposit_tx.concatenate())
        .map_err(|e| ClientError::Request(format!("invalid deposit transaction: {e}")))?;
    let output = transaction
        .output
        .get(output_index as usize)
        .ok_or_else(|| ClientError::Reverted {
            reason: "Deposit output index out of range".to_string(),
        })?;

    Ok((transaction.compute_txid(), output.value))
}

#[async_trait]
impl Bridge for InMemoryBridge {
    async fn reveal_deposit(
        &self,
        deposit_tx: &DecomposedRawTransaction,
        deposit_output_index: u32,
        receipt: &DepositReceipt,
        vault: Option<ChainIdentifier>,
    ) -> ClientResult<HostChainTxHash> {
        let (txid, amount) = txid_and_value(deposit_tx, deposit_output_index)?;
        let outpoint = OutPoint {
            txid,
            vout: deposit_output_index,
        };

        let mut state = self.write();
        if state
            .deposits
            .get(&outpoint)
            .is_some_and(DepositRequest::is_revealed)
        {
            return Err(ClientError::Reverted {
                reason: DEPOSIT_ALREADY_REVEALED.to_string(),
            });
        }

        state.deposits.insert(
            outpoint,
            DepositRequest {
                depositor: receipt.depositor,
                amount,
                vault,
                revealed_at: 1,
                swept_at: 0,
                treasury_fee: Amount::ZERO,
            },
        );

        Ok(state.submit(Submission::RevealDeposit {
            deposit_tx: deposit_tx.clone(),
            deposit_output_index,
            receipt: receipt.clone(),
            vault,
        }))
    }

    async fn submit_deposit_sweep_proof(
        &self,
        sweep_tx: &DecomposedRawTransaction,
        sweep_proof: &SpvProof,
        main_utxo: &Utxo,
        vault: Option<ChainIdentifier>,
    ) -> ClientResult<HostChainTxHash> {
        Ok(self.write().submit(Submission::DepositSweepProof {
            sweep_tx: sweep_tx.clone(),
            proof: sweep_proof.clone(),
            main_utxo: *main_utxo,
            vault,
        }))
    }

    async fn request_redemption(
        &self,
        wallet_public_key: &PublicKey,
        main_utxo: &Utxo,
        redeemer_output_script: &Script,
        amount: Amount,
    ) -> ClientResult<HostChainTxHash> {
        Ok(self.write().submit(Submission::RequestRedemption {
            wallet_public_key: *wallet_public_key,
            main_utxo: *main_utxo,
            redeemer_output_script: redeemer_output_script.to_owned(),
            amount,
        }))
    }

    async fn submit_redemption_proof(
        &self,
        redemption_tx: &DecomposedRawTransaction,
        redemption_proof: &SpvProof,
        main_utxo: &Utxo,
        wallet_public_key: &PublicKey,
    ) -> ClientResult<HostChainTxHash> {
        Ok(self.write().submit(Submission::RedemptionProof {
            redemption_tx: redemption_tx.clone(),
            proof: redemption_proof.clone(),
            main_utxo: *main_utxo,
            wallet_public_key: *wallet_public_key,
        }))
    }

    async fn pending_redemptions(
        &self,
        wallet_public_key_hash: [u8; 20],
        redeemer_output_script: &Script,
    ) -> ClientResult<RedemptionRequest> {
        Ok(self
            .read()
            .pending_redemptions
            .get(&(wallet_public_key_hash, redeemer_output_script.to_owned()))
            .cloned()
            .unwrap_or_else(|| missing_redemption(redeemer_output_script)))
    }

    async fn timed_out_redemptions(
        &self,
        wallet_public_key_hash: [u8; 20],
        redeemer_output_script: &Script,
    ) -> ClientResult<RedemptionRequest> {
        Ok(self
            .read()
            .timed_out_redemptions
            .get(&(wallet_public_key_hash, redeemer_output_script.to_owned()))
            .cloned()
            .unwrap_or_else(|| missing_redemption(redeemer_output_script)))
    }

    async fn deposits(&self, deposit_outpoint: OutPoint) -> ClientResult<DepositRequest> {
        Ok(self
            .read()
            .deposits
            .get(&deposit_outpoint)
            .cloned()
            .unwrap_or(DepositRequest {
                depositor: ChainIdentifier::new([0u8; 20]),
                amount: Amount::ZERO,
                vault: None,
                revealed_at: 0,
                swept_at: 0,
                treasury_fee: Amount::ZERO,
            }))
    }

    async fn active_wallet_public_key_hash(&self) -> ClientResult<Option<[u8; 20]>> {
        Ok(self.read().active_wallet_public_key_hash)
    }

    async fn wallets(&self, wallet_public_key_hash: [u8; 20]) -> ClientResult<Wallet> {
        Ok(self
            .read()
            .wallets
            .get(&wallet_public_key_hash)
            .cloned()
            .unwrap_or(Wallet {
                main_utxo_hash: [0u8; 32],
                pending_redemptions_value: Amount::ZERO,
                created_at: 0,
                state: WalletState::Unknown,
            }))
    }

    async fn tx_proof_difficulty_factor(&self) -> ClientResult<u32> {
        Ok(self.read().tx_proof_difficulty_factor)
    }
}
