//! Module to generate random values for testing.

use bitcoin::{
    hashes::Hash,
    key::rand::{rngs::OsRng, Rng},
    secp256k1::SecretKey,
    NetworkKind, OutPoint, PrivateKey, Txid,
};
use tbtc_bridge_primitives::{key::SigningKey, types::ChainIdentifier};

/// Generates a random transaction ID.
pub fn generate_txid() -> Txid {
    let mut txid = [0u8; 32];
    OsRng.fill(&mut txid);

    Txid::from_byte_array(txid)
}

/// Generates a random outpoint.
pub fn generate_outpoint() -> OutPoint {
    let vout: u32 = OsRng.gen();

    OutPoint {
        txid: generate_txid(),
        vout,
    }
}

/// Generates a random testnet signing key with a compressed public key.
pub fn generate_keypair() -> SigningKey {
    let secret_key = SecretKey::new(&mut OsRng);

    SigningKey::new(PrivateKey::new(secret_key, NetworkKind::Test))
}

/// Generates a random host chain identifier.
pub fn generate_chain_identifier() -> ChainIdentifier {
    let mut bytes = [0u8; 20];
    OsRng.fill(&mut bytes);

    ChainIdentifier::new(bytes)
}
