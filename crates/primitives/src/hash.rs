//! Hash functions used by Bitcoin scripts, transactions and headers.
//!
//! The SHA-256 based hashes use [RustCrypto's SHA-2 crate](https://github.com/RustCrypto/hashes/tree/master/sha2)
//! so that the outputs can be compared byte-for-byte against values committed on other chains.

use bitcoin::hashes::{hash160, Hash};
use sha2::{Digest, Sha256};

/// Computes `SHA-256(data)`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Computes `SHA-256(SHA-256(data))`, the hash Bitcoin uses for transaction ids, Merkle nodes and
/// block headers.
///
/// The result is in the internal (little-endian) byte order.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// Computes `RIPEMD-160(SHA-256(data))`.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

/// Returns a copy of `hash` with the byte order reversed.
///
/// Converts between the internal byte order and the order used for display.
pub fn reverse<const N: usize>(hash: &[u8; N]) -> [u8; N] {
    let mut reversed = *hash;
    reversed.reverse();

    reversed
}
