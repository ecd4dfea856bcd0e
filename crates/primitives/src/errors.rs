//! Validation errors raised by the primitives in this crate.

use bitcoin::{address, consensus::encode, key};
use thiserror::Error;

use crate::network::BitcoinNetwork;

/// Errors that can occur while validating or converting Bitcoin primitives.
#[derive(Debug, Error)]
pub enum PrimitivesError {
    /// A fixed-size field was supplied with the wrong number of bytes.
    #[error("invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Name of the offending field.
        field: &'static str,

        /// The required length in bytes.
        expected: usize,

        /// The supplied length in bytes.
        actual: usize,
    },

    /// A byte blob that should be a concatenation of fixed-size items is not.
    #[error("{what} length {actual} is not a multiple of {chunk}")]
    UnalignedLength {
        /// What was being split.
        what: &'static str,

        /// The size of a single item.
        chunk: usize,

        /// The supplied length in bytes.
        actual: usize,
    },

    /// A compressed public key was required but an uncompressed one was supplied.
    #[error("public key must be compressed")]
    UncompressedPublicKey,

    /// The bytes do not represent a valid public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[from] key::FromSliceError),

    /// The WIF string does not represent a valid private key.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(#[from] key::FromWifError),

    /// The key or address was created for a different network.
    #[error("expected a {expected:?} key or address")]
    NetworkMismatch {
        /// The network that was required.
        expected: BitcoinNetwork,
    },

    /// The network cannot be used to encode addresses.
    #[error("unsupported bitcoin network {0:?}")]
    UnsupportedNetwork(BitcoinNetwork),

    /// The address string could not be parsed or belongs to another network.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] address::ParseError),

    /// The script has no address representation.
    #[error("script has no address form: {0}")]
    NoAddressForm(#[from] address::FromScriptError),

    /// The address is neither P2PKH nor P2WPKH.
    #[error("address does not pay to a public key hash")]
    NotPublicKeyHashAddress,

    /// The refund locktime does not fit into 4 bytes.
    #[error("refund locktime overflows 4 bytes")]
    LocktimeOverflow,

    /// The compact `bits` encoding produces a target outside of 256 bits.
    #[error("invalid compact target bits {0:#010x}")]
    InvalidBits(u32),

    /// A target of zero has no difficulty.
    #[error("difficulty target is zero")]
    ZeroTarget,

    /// Consensus decoding failed.
    #[error("decode: {0}")]
    Decode(#[from] encode::Error),

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Result type alias for [`PrimitivesError`].
pub type PrimitivesResult<T> = Result<T, PrimitivesError>;
