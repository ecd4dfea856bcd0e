//! Public key helpers and the signing key used to sign bridge transactions.

use bitcoin::{secp256k1::Message, PrivateKey, PublicKey};
use secp256k1::{ecdsa::Signature, SECP256K1};

use crate::{
    errors::{PrimitivesError, PrimitivesResult},
    hash::hash160,
    network::BitcoinNetwork,
};

/// Compresses an uncompressed public key given as its 64-byte `X ‖ Y` coordinates (no `04`
/// prefix).
///
/// The compressed form is `02 ‖ X` for an even `Y` and `03 ‖ X` for an odd `Y`.
pub fn compress_public_key(public_key: &[u8]) -> PrimitivesResult<[u8; 33]> {
    if public_key.len() != 64 {
        return Err(PrimitivesError::InvalidLength {
            field: "uncompressed public key",
            expected: 64,
            actual: public_key.len(),
        });
    }

    let mut compressed = [0u8; 33];
    compressed[0] = if public_key[63] % 2 == 0 { 0x02 } else { 0x03 };
    compressed[1..].copy_from_slice(&public_key[..32]);

    Ok(compressed)
}

/// Whether `public_key` is a 33-byte key with a `02` or `03` prefix.
pub fn is_compressed_public_key(public_key: &[u8]) -> bool {
    public_key.len() == 33 && matches!(public_key[0], 0x02 | 0x03)
}

/// Computes the HASH160 of a compressed public key.
pub fn public_key_hash(public_key: &PublicKey) -> PrimitivesResult<[u8; 20]> {
    if !public_key.compressed {
        return Err(PrimitivesError::UncompressedPublicKey);
    }

    Ok(hash160(&public_key.to_bytes()))
}

/// Parses a serialized public key, compressed or not.
pub fn parse_public_key(bytes: &[u8]) -> PrimitivesResult<PublicKey> {
    Ok(PublicKey::from_slice(bytes)?)
}

/// An ECDSA key able to sign the inputs it controls.
#[derive(Debug, Clone)]
pub struct SigningKey {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl SigningKey {
    /// Decodes a WIF private key, checking that it was encoded for `network`.
    pub fn from_wif(wif: &str, network: BitcoinNetwork) -> PrimitivesResult<Self> {
        let private_key = PrivateKey::from_wif(wif)?;

        if private_key.network != network.kind()? {
            return Err(PrimitivesError::NetworkMismatch { expected: network });
        }

        Ok(Self::new(private_key))
    }

    /// Wraps an already decoded private key.
    pub fn new(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key(SECP256K1);

        Self {
            private_key,
            public_key,
        }
    }

    /// The public key matching this signing key.
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// HASH160 of the public key; fails when the key is not compressed.
    pub fn public_key_hash(&self) -> PrimitivesResult<[u8; 20]> {
        public_key_hash(&self.public_key)
    }

    /// Signs a 32-byte sighash digest.
    ///
    /// Nonces are derived deterministically (RFC 6979), so signing the same digest twice yields
    /// the same signature.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Signature {
        SECP256K1.sign_ecdsa(&Message::from_digest(digest), &self.private_key.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET_WIF: &str = "cRk1zdau3jp2X3XsrRKDdviYLuC32fHfyU186wLBEbZWx4uQWW3v";

    #[test]
    fn test_signing_key_from_wif() {
        let key = SigningKey::from_wif(WALLET_WIF, BitcoinNetwork::Testnet).expect("must decode");

        assert_eq!(
            key.public_key().to_string(),
            "03989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d9"
        );
        assert_eq!(
            hex::encode(key.public_key_hash().expect("must be compressed")),
            "8db50eb52063ea9d98b3eac91489a90f738986f6"
        );
    }

    #[test]
    fn test_signing_key_network_mismatch() {
        let err = SigningKey::from_wif(WALLET_WIF, BitcoinNetwork::Mainnet)
            .expect_err("testnet key must be rejected on mainnet");

        assert!(matches!(
            err,
            PrimitivesError::NetworkMismatch {
                expected: BitcoinNetwork::Mainnet
            }
        ));
    }

    #[test]
    fn test_compress_public_key() {
        let key = SigningKey::from_wif(WALLET_WIF, BitcoinNetwork::Testnet).expect("must decode");
        let uncompressed = key.public_key().inner.serialize_uncompressed();

        let compressed = compress_public_key(&uncompressed[1..]).expect("must compress");

        assert_eq!(compressed, key.public_key().inner.serialize());
        assert!(is_compressed_public_key(&compressed));
        assert!(!is_compressed_public_key(&uncompressed));
        assert!(compress_public_key(&uncompressed).is_err());
    }

    #[test]
    fn test_public_key_hash_requires_compressed_key() {
        let key = SigningKey::from_wif(WALLET_WIF, BitcoinNetwork::Testnet).expect("must decode");
        let uncompressed = PublicKey::new_uncompressed(key.public_key().inner);

        assert!(matches!(
            public_key_hash(&uncompressed),
            Err(PrimitivesError::UncompressedPublicKey)
        ));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = SigningKey::from_wif(WALLET_WIF, BitcoinNetwork::Testnet).expect("must decode");

        assert_eq!(key.sign_digest([7u8; 32]), key.sign_digest([7u8; 32]));
    }
}
