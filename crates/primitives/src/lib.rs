//! This crate contains the types, codecs and pure functions that describe the Bitcoin side of the
//! tBTC bridge: deposit receipts and their scripts, addresses, keys, block headers and the
//! decomposed transaction format expected by the on-chain bridge.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it does not depend on any
//! other crate in this workspace.

pub mod address;
pub mod block;
pub mod codec;
pub mod deposit;
pub mod errors;
pub mod hash;
pub mod key;
pub mod network;
pub mod scripts;
pub mod types;

#[cfg(test)]
mod test_utils;
