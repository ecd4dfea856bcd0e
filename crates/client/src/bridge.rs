//! The bridge contract handle consumed by the deposit, sweep and redemption flows.

use async_trait::async_trait;
use bitcoin::{hashes::Hash, Amount, OutPoint, PublicKey, Script};
use sha3::{Digest, Keccak256};
use tbtc_bridge_primitives::{
    codec::DecomposedRawTransaction,
    deposit::DepositReceipt,
    types::{
        ChainIdentifier, DepositRequest, HostChainTxHash, RedemptionRequest, SpvProof, Utxo,
        Wallet,
    },
};

use crate::errors::ClientResult;

/// Read and write access to the on-chain bridge.
///
/// Writes return the hash of the host chain transaction that carried the call. Reverts surface as
/// [`ClientError::Reverted`](crate::errors::ClientError::Reverted) with the revert reason.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Reveals a funded deposit so that the wallet can sweep it.
    async fn reveal_deposit(
        &self,
        deposit_tx: &DecomposedRawTransaction,
        deposit_output_index: u32,
        receipt: &DepositReceipt,
        vault: Option<ChainIdentifier>,
    ) -> ClientResult<HostChainTxHash>;

    /// Submits the SPV proof of a deposit sweep.
    async fn submit_deposit_sweep_proof(
        &self,
        sweep_tx: &DecomposedRawTransaction,
        sweep_proof: &SpvProof,
        main_utxo: &Utxo,
        vault: Option<ChainIdentifier>,
    ) -> ClientResult<HostChainTxHash>;

    /// Requests a redemption of `amount` to `redeemer_output_script` from the given wallet.
    async fn request_redemption(
        &self,
        wallet_public_key: &PublicKey,
        main_utxo: &Utxo,
        redeemer_output_script: &Script,
        amount: Amount,
    ) -> ClientResult<HostChainTxHash>;

    /// Submits the SPV proof of a redemption.
    async fn submit_redemption_proof(
        &self,
        redemption_tx: &DecomposedRawTransaction,
        redemption_proof: &SpvProof,
        main_utxo: &Utxo,
        wallet_public_key: &PublicKey,
    ) -> ClientResult<HostChainTxHash>;

    /// The pending redemption request for the wallet and output script.
    ///
    /// A request that does not exist is returned with `requested_at` set to zero.
    async fn pending_redemptions(
        &self,
        wallet_public_key_hash: [u8; 20],
        redeemer_output_script: &Script,
    ) -> ClientResult<RedemptionRequest>;

    /// The timed out redemption request for the wallet and output script.
    ///
    /// A request that does not exist is returned with `requested_at` set to zero.
    async fn timed_out_redemptions(
        &self,
        wallet_public_key_hash: [u8; 20],
        redeemer_output_script: &Script,
    ) -> ClientResult<RedemptionRequest>;

    /// The revealed deposit funded by `deposit_outpoint`.
    async fn deposits(&self, deposit_outpoint: OutPoint) -> ClientResult<DepositRequest>;

    /// Public key hash of the wallet currently accepting deposits, if any.
    async fn active_wallet_public_key_hash(&self) -> ClientResult<Option<[u8; 20]>>;

    /// The wallet registered under `wallet_public_key_hash`.
    async fn wallets(&self, wallet_public_key_hash: [u8; 20]) -> ClientResult<Wallet>;

    /// Number of confirmations a transaction needs before its proof is accepted.
    async fn tx_proof_difficulty_factor(&self) -> ClientResult<u32>;

    /// The commitment the bridge stores for a main UTXO.
    fn build_utxo_hash(&self, utxo: &Utxo) -> [u8; 32] {
        build_main_utxo_hash(utxo)
    }
}

/// Computes `keccak256(txid ‖ vout ‖ value)` the way the bridge contract packs it.
///
/// The txid is taken in internal byte order, the output index as a 4-byte big-endian integer and
/// the value as an 8-byte big-endian integer.
pub fn build_main_utxo_hash(utxo: &Utxo) -> [u8; 32] {
    Keccak256::new()
        .chain_update(utxo.outpoint.txid.to_byte_array())
        .chain_update(utxo.outpoint.vout.to_be_bytes())
        .chain_update(utxo.value.to_sat().to_be_bytes())
        .finalize()
        .into()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bitcoin::Txid;

    use super::*;

    #[test]
    fn test_build_main_utxo_hash() {
        let txid = Txid::from_str("ea374ab6842723c647c3fc0ab281ca0641eaa768576cf9df695ca5b827140214")
            .expect("must be valid txid");
        let utxo = Utxo::new(txid, 1, Amount::from_sat(200_000));

        assert_eq!(
            hex::encode(build_main_utxo_hash(&utxo)),
            "6794380163d9952af18bd060e297aac4982becb575e0a296ff525f14d0617506"
        );

        let other_output = Utxo::new(txid, 0, Amount::from_sat(200_000));
        assert_ne!(build_main_utxo_hash(&utxo), build_main_utxo_hash(&other_output));
    }
}
