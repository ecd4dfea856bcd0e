//! Assembly and validation of complete SPV proofs.

use bitcoin::Txid;
use ethnum::U256;
use tbtc_bridge_client::bitcoin_client::BitcoinClient;
use tbtc_bridge_primitives::{
    block::deserialize_headers_chain, codec::DecomposedRawTransaction, types::SpvProof,
};
use tracing::{debug, info};

use crate::{
    errors::{SpvError, SpvResult},
    headers::validate_headers_chain,
    merkle::{create_merkle_proof, validate_merkle_tree},
};

/// A transaction together with the proof of its inclusion in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenTransaction {
    /// The proven transaction, in the form the bridge consumes it.
    pub transaction: DecomposedRawTransaction,

    /// Its inclusion proof.
    pub proof: SpvProof,
}

/// Assembles a proof that `tx_hash` is included in the chain and has at least
/// `required_confirmations` confirmations.
///
/// The proof carries `required_confirmations` headers: the one of the block including the
/// transaction followed by the headers of the blocks mined on top of it.
pub async fn assemble_spv_proof<C>(
    client: &C,
    tx_hash: Txid,
    required_confirmations: u32,
) -> SpvResult<ProvenTransaction>
where
    C: BitcoinClient + ?Sized,
{
    let raw_transaction = client.get_raw_transaction(tx_hash).await?;
    let transaction = DecomposedRawTransaction::from_raw(&raw_transaction)?;

    let confirmations = client.get_transaction_confirmations(tx_hash).await?;
    if confirmations < required_confirmations {
        return Err(SpvError::InsufficientConfirmations {
            confirmations,
            required: required_confirmations,
        });
    }

    let latest_block_height = client.latest_block_height().await?;
    let tx_block_height = latest_block_height
        .saturating_add(1)
        .checked_sub(u64::from(confirmations))
        .ok_or(SpvError::InconsistentChainHeight {
            confirmations,
            latest_block_height,
        })?;

    // the block including the transaction is the first confirmation
    let chain_length = u64::from(required_confirmations.saturating_sub(1));
    let bitcoin_headers = client
        .get_headers_chain(tx_block_height, chain_length)
        .await?;

    let merkle_branch = client
        .get_transaction_merkle(tx_hash, tx_block_height)
        .await?;

    debug!(
        %tx_hash,
        %tx_block_height,
        %confirmations,
        position = %merkle_branch.position,
        "assembled spv proof"
    );

    Ok(ProvenTransaction {
        transaction,
        proof: SpvProof {
            merkle_proof: create_merkle_proof(&merkle_branch),
            tx_index_in_block: merkle_branch.position,
            bitcoin_headers,
        },
    })
}

/// Assembles the proof of `tx_hash` and checks it the way the bridge would.
///
/// The header chain must hold exactly `required_confirmations` headers mined at
/// `previous_difficulty` or `current_difficulty`, and the Merkle proof must lead to the root
/// committed in its first header.
pub async fn validate_spv_proof<C>(
    client: &C,
    tx_hash: Txid,
    required_confirmations: u32,
    previous_difficulty: U256,
    current_difficulty: U256,
) -> SpvResult<()>
where
    C: BitcoinClient + ?Sized,
{
    if required_confirmations < 1 {
        return Err(SpvError::ZeroRequiredConfirmations);
    }

    let ProvenTransaction { transaction, proof } =
        assemble_spv_proof(client, tx_hash, required_confirmations).await?;

    let headers = deserialize_headers_chain(&proof.bitcoin_headers)?;
    let wrong_count = || SpvError::WrongHeaderCount {
        expected: required_confirmations,
        actual: headers.len(),
    };
    if headers.len() != required_confirmations as usize {
        return Err(wrong_count());
    }
    let first = headers.first().ok_or_else(wrong_count)?;

    let actual = transaction.compute_txid();
    if actual != tx_hash {
        return Err(SpvError::TxHashMismatch {
            expected: tx_hash,
            actual,
        });
    }

    validate_merkle_tree(
        tx_hash,
        first.merkle_root_hash,
        &proof.merkle_proof,
        proof.tx_index_in_block,
    )?;
    validate_headers_chain(&headers, previous_difficulty, current_difficulty)?;

    info!(%tx_hash, %required_confirmations, "spv proof is valid");

    Ok(())
}
