//! The configuration of a client embedding the bridge engine.
//!
//! The values are not consensus-critical: they only tune how the client talks to its collaborators
//! and which output types it produces. Nothing here is global state; callers pass the parsed
//! values explicitly to the functions that need them.

use std::{fs, io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tbtc_bridge_client::{
    bitcoin_client::DEFAULT_HISTORY_DEPTH,
    retry::{RetryPolicy, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_JITTER, DEFAULT_MAX_RETRIES},
};
use tbtc_bridge_primitives::{deposit::DEFAULT_REFUND_LOCKTIME_DURATION, network::BitcoinNetwork};
use thiserror::Error;
use tracing::{debug, trace};

use crate::logging::LoggingConfig;

/// Errors that can occur while loading a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] io::Error),

    /// The configuration is not valid TOML or does not match the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured network cannot be used to encode addresses.
    #[error("unsupported network: {0:?}")]
    UnsupportedNetwork(BitcoinNetwork),
}

/// Top-level configuration of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The Bitcoin network the client operates on.
    pub network: BitcoinNetwork,

    /// Whether the wallet and change outputs the client produces are P2WPKH rather than P2PKH.
    #[serde(default = "default_witness")]
    pub witness: bool,

    /// Retries applied to calls into the bridge and the Bitcoin data source.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Deposit parameters.
    #[serde(default)]
    pub deposit: DepositConfig,

    /// Main UTXO resolution parameters.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Log filtering and formatting.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serializable form of a [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of retries after the first attempt.
    pub max_retries: usize,

    /// Delay before the first retry; doubled after every failed retry.
    pub initial_backoff: Duration,

    /// Upper bound (exclusive) of the random jitter added to every delay, in milliseconds.
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_jitter_ms: DEFAULT_MAX_JITTER.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    /// The policy described by this configuration.
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.initial_backoff,
            Duration::from_millis(self.max_jitter_ms),
        )
    }
}

/// Deposit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositConfig {
    /// Seconds after the deposit creation at which the depositor may take the funds back.
    pub refund_locktime_duration_secs: u32,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            refund_locktime_duration_secs: DEFAULT_REFUND_LOCKTIME_DURATION,
        }
    }
}

/// Main UTXO resolution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Number of most recent transactions inspected per wallet address.
    pub history_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

const fn default_witness() -> bool {
    true
}

impl ClientConfig {
    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Self>(s)?;

        if config.network == BitcoinNetwork::Unknown {
            return Err(ConfigError::UnsupportedNetwork(config.network));
        }

        debug!(?config, "parsed client config");

        Ok(config)
    }

    /// Reads and parses the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        trace!(path = %path.as_ref().display(), "read config file");

        Self::from_toml_str(&contents)
    }
}
