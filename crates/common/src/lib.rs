//! Crate includes reusable utils for binaries embedding the bridge engine.
//! Such as initializing the tracing framework and loading the client configuration.

pub mod config;
pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
