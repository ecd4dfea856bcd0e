//! Assembles and signs the four kinds of Bitcoin transactions the bridge relies on: deposit
//! funding, deposit sweeps, redemptions and deposit refunds.
//!
//! The assemblers are pure. They take fully resolved UTXOs (with their parent transactions) and
//! return signed transactions, leaving fetching and broadcasting to the callers.

pub mod errors;
pub mod funding;
pub mod redemption;
pub mod refund;
pub mod signer;
pub mod sweep;
