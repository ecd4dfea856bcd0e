//! Contracts of the two external collaborators the bridge engine talks to: a Bitcoin data source
//! and the on-chain bridge handle.
//!
//! Neither is implemented here. Callers plug in their own clients, optionally wrapped in
//! [`retrying`] to get bounded retries with exponential backoff.

pub mod bitcoin_client;
pub mod bridge;
pub mod errors;
pub mod retry;
pub mod retrying;
