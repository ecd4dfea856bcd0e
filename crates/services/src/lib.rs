//! The flows that tie the transaction assemblers and the SPV prover to the two external
//! collaborators: a Bitcoin data source and the on-chain bridge.
//!
//! Every flow takes its collaborators and the target network explicitly. Failures are never
//! recovered here; they surface to the caller, who decides whether to retry with fresh inputs.

pub mod deposits;
pub mod errors;
pub mod maintenance;
pub mod wallet;

mod fetch;
