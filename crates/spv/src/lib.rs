//! Simplified payment verification for bridge transactions.
//!
//! A proof ties a transaction to the block that includes it through a Merkle branch, and to the
//! chain through the headers of that block and the blocks mined on top of it. The bridge accepts a
//! proof once the header chain is long enough and carries the difficulty of the current or the
//! previous epoch.

pub mod errors;
pub mod headers;
pub mod merkle;
pub mod proof;
