//! Domain types shared by the transaction assemblers, the SPV prover and the bridge collaborators.

use std::{fmt, str::FromStr};

use bitcoin::{Amount, OutPoint, ScriptBuf, Transaction, TxMerkleNode, Txid};
use serde::{Deserialize, Serialize};

use crate::errors::{PrimitivesError, PrimitivesResult};

/// A 20-byte identifier of an account on the host chain, such as a depositor or a vault.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainIdentifier(#[serde(with = "hex::serde")] [u8; 20]);

impl ChainIdentifier {
    /// Creates a new identifier from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the identifier.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for ChainIdentifier {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        let actual = bytes.len();
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| PrimitivesError::InvalidLength {
                field: "identifier",
                expected: 20,
                actual,
            })?;

        Ok(Self(bytes))
    }
}

impl fmt::Display for ChainIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ChainIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainIdentifier({self})")
    }
}

/// Hash of a transaction submitted to the host chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostChainTxHash(#[serde(with = "hex::serde")] [u8; 32]);

impl HostChainTxHash {
    /// Creates a new hash from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the hash.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for HostChainTxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for HostChainTxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostChainTxHash({self})")
    }
}

/// An unspent transaction output.
///
/// Created once a transaction confirms and consumed exactly once as a transaction input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Utxo {
    /// Transaction hash and output index that identify the output.
    pub outpoint: OutPoint,

    /// Value locked in the output.
    pub value: Amount,
}

impl Utxo {
    /// Creates a new [`Utxo`].
    pub const fn new(txid: Txid, vout: u32, value: Amount) -> Self {
        Self {
            outpoint: OutPoint { txid, vout },
            value,
        }
    }
}

/// A [`Utxo`] along with the transaction that created it.
///
/// Signing needs the previous output's script, which only the parent transaction carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoWithTx {
    /// The spendable output.
    pub utxo: Utxo,

    /// The transaction whose output is [`Self::utxo`].
    pub transaction: Transaction,
}

impl UtxoWithTx {
    /// Returns the output of the parent transaction that this UTXO refers to, if it exists.
    pub fn previous_output(&self) -> Option<&bitcoin::TxOut> {
        self.transaction
            .output
            .get(self.utxo.outpoint.vout as usize)
    }
}

/// The Merkle branch of a transaction as reported by an Electrum-like server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxMerkleBranch {
    /// Height of the block the transaction was included in.
    pub block_height: u64,

    /// Sibling hashes from the leaf level up to, but excluding, the root.
    pub merkle: Vec<TxMerkleNode>,

    /// 0-based position of the transaction in the block.
    pub position: u32,
}

/// Proof that a transaction was included in the chain and has accumulated confirmations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpvProof {
    /// Concatenated sibling hashes in internal byte order.
    pub merkle_proof: Vec<u8>,

    /// Position of the transaction in its block.
    pub tx_index_in_block: u32,

    /// Concatenated 80-byte headers, starting with the block that includes the transaction.
    pub bitcoin_headers: Vec<u8>,
}

/// A redemption request as stored on the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRequest {
    /// Host chain account that requested the redemption.
    pub redeemer: ChainIdentifier,

    /// Output script the redeemed BTC must be locked to.
    pub redeemer_output_script: ScriptBuf,

    /// Total amount requested, including the fees charged from it.
    pub requested_amount: Amount,

    /// Fee kept by the treasury.
    pub treasury_fee: Amount,

    /// Maximum Bitcoin transaction fee this request can contribute.
    pub tx_max_fee: Amount,

    /// Timestamp of the request; zero when the request does not exist.
    pub requested_at: u32,
}

impl RedemptionRequest {
    /// Whether the bridge actually knows about this request.
    pub const fn exists(&self) -> bool {
        self.requested_at != 0
    }

    /// Value of the output paying the redeemer: `requested_amount - tx_max_fee - treasury_fee`.
    ///
    /// Returns [`None`] when the fees exceed the requested amount.
    pub fn output_value(&self) -> Option<Amount> {
        self.requested_amount
            .checked_sub(self.tx_max_fee)?
            .checked_sub(self.treasury_fee)
    }
}

/// A revealed deposit as stored on the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    /// Host chain account that revealed the deposit.
    pub depositor: ChainIdentifier,

    /// Value of the deposit output.
    pub amount: Amount,

    /// Vault the minted tokens are routed to, if any.
    pub vault: Option<ChainIdentifier>,

    /// Timestamp of the reveal; zero when the deposit was never revealed.
    pub revealed_at: u32,

    /// Timestamp of the sweep; zero while the deposit is not swept.
    pub swept_at: u32,

    /// Fee kept by the treasury once the deposit is swept.
    pub treasury_fee: Amount,
}

impl DepositRequest {
    /// Whether the deposit was revealed to the bridge.
    pub const fn is_revealed(&self) -> bool {
        self.revealed_at != 0
    }

    /// Whether the deposit was already swept by its wallet.
    pub const fn is_swept(&self) -> bool {
        self.swept_at != 0
    }
}

/// Which set of redemption requests to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionRequestKind {
    /// Requests waiting to be handled by the wallet.
    Pending,

    /// Requests the wallet failed to handle in time.
    TimedOut,
}

/// Lifecycle state of a bridge wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WalletState {
    /// The wallet is unknown to the bridge.
    #[default]
    Unknown = 0,

    /// The wallet can sweep deposits and accept redemption requests.
    Live = 1,

    /// The wallet was deemed unhealthy and is moving its funds to another wallet.
    MovingFunds = 2,

    /// The wallet moved or redeemed all its funds and is in the closing period.
    Closing = 3,

    /// The wallet finalized the closing period.
    Closed = 4,

    /// The wallet committed a fraud that was reported.
    Terminated = 5,
}

impl TryFrom<u8> for WalletState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Unknown,
            1 => Self::Live,
            2 => Self::MovingFunds,
            3 => Self::Closing,
            4 => Self::Closed,
            5 => Self::Terminated,
            other => return Err(other),
        })
    }
}

/// The subset of on-chain wallet data this engine consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    /// Commitment to the wallet's main UTXO; all zeros when the wallet has none.
    pub main_utxo_hash: [u8; 32],

    /// Sum of all pending redemption requests handled by the wallet.
    pub pending_redemptions_value: Amount,

    /// Timestamp the wallet was created at.
    pub created_at: u32,

    /// Current lifecycle state.
    pub state: WalletState,
}

impl Wallet {
    /// Whether a main UTXO is registered for the wallet.
    pub fn has_main_utxo(&self) -> bool {
        self.main_utxo_hash != [0u8; 32]
    }
}

/// Parses a hex string into a fixed-size array, reporting `field` on length mismatch.
pub fn parse_fixed_hex<const N: usize>(field: &'static str, s: &str) -> PrimitivesResult<[u8; N]> {
    let bytes = hex::decode(s.trim_start_matches("0x"))?;
    let actual = bytes.len();

    bytes
        .try_into()
        .map_err(|_| PrimitivesError::InvalidLength {
            field,
            expected: N,
            actual,
        })
}
