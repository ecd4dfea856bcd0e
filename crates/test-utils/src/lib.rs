//! This crate provides test-utilities for the bridge engine.
//!
//! It contains in-memory doubles of the two external collaborators, the Bitcoin data source and
//! the bridge handle, along with random value generators and fixtures taken from real
//! transactions and blocks.

pub mod bitcoin_client;
pub mod bridge;
pub mod generators;
pub mod proofs;
pub mod transactions;
