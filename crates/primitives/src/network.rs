//! Bitcoin networks the bridge can operate on.

use bitcoin::{BlockHash, Network, NetworkKind};
use serde::{Deserialize, Serialize};

use crate::errors::{PrimitivesError, PrimitivesResult};

/// Display-order hash of the mainnet genesis block.
pub const MAINNET_GENESIS_HASH: &str =
    "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

/// Display-order hash of the testnet3 genesis block.
pub const TESTNET_GENESIS_HASH: &str =
    "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943";

/// The Bitcoin network a client is connected to.
///
/// Every function that encodes addresses or decodes keys takes the network explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    /// The network could not be determined.
    Unknown,

    /// Bitcoin testnet.
    Testnet,

    /// Bitcoin mainnet.
    Mainnet,
}

impl BitcoinNetwork {
    /// Determines the network from the hash of its genesis block.
    pub fn from_genesis_hash(genesis_hash: &BlockHash) -> Self {
        match genesis_hash.to_string().as_str() {
            MAINNET_GENESIS_HASH => Self::Mainnet,
            TESTNET_GENESIS_HASH => Self::Testnet,
            _ => Self::Unknown,
        }
    }

    /// Converts to the [`Network`] used for address and key encoding.
    pub fn to_bitcoin_network(self) -> PrimitivesResult<Network> {
        match self {
            Self::Mainnet => Ok(Network::Bitcoin),
            Self::Testnet => Ok(Network::Testnet),
            Self::Unknown => Err(PrimitivesError::UnsupportedNetwork(self)),
        }
    }

    /// Returns the [`NetworkKind`] that determines key and base58 address prefixes.
    pub fn kind(self) -> PrimitivesResult<NetworkKind> {
        match self {
            Self::Mainnet => Ok(NetworkKind::Main),
            Self::Testnet => Ok(NetworkKind::Test),
            Self::Unknown => Err(PrimitivesError::UnsupportedNetwork(self)),
        }
    }
}
