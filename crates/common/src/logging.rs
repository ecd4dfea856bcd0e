//! Provides utilities to initialize logging for a client embedding the bridge engine.
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::*;
use tracing_subscriber::{
    filter::ParseError,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "TBTC_BRIDGE_SVC_LABEL";

/// Filter directives used when neither `RUST_LOG` nor the configuration sets any.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Errors that can occur while installing the logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directives could not be parsed.
    #[error("invalid log filter directives: {0}")]
    InvalidDirectives(#[from] ParseError),

    /// A global subscriber was already installed.
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// The `[logging]` section of the client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives such as `tbtc_bridge_services=debug,info`. `RUST_LOG` takes precedence.
    pub directives: Option<String>,

    /// Whether every event carries its source file. `LOG_FILE=1` forces it on.
    pub with_file: bool,

    /// Whether every event carries its source line. `LOG_LINE_NUM=1` forces it on.
    pub with_line_number: bool,
}

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,

    settings: LoggingConfig,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set and the default settings.
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            settings: LoggingConfig::default(),
        }
    }

    /// Creates a new instance with the whoami string set to the provided
    /// string.
    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// Applies the `[logging]` section of the client configuration.
    pub fn with_settings(mut self, settings: LoggingConfig) -> Self {
        self.settings = settings;
        self
    }

    /// The whoami string logged when logging starts.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }

    /// The filter directives in effect, `RUST_LOG` first.
    pub fn directives(&self) -> String {
        env::var(EnvFilter::DEFAULT_ENV)
            .ok()
            .or_else(|| self.settings.directives.clone())
            .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(tbtc-bridge)")
    }
}

/// Installs the global logger described by `config`.
///
/// Events go to stdout in the compact format.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    let filt = EnvFilter::try_new(config.directives())?;

    let log_file = config.settings.with_file || env_flag("LOG_FILE");
    let log_line_num = config.settings.with_line_number || env_flag("LOG_LINE_NUM");

    // Stdout logging.
    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(log_file)
                .with_line_number(log_line_num),
        )
        .with_filter(filt);

    tracing_subscriber::registry().with(stdout_sub).try_init()?;

    info!(whoami = %config.whoami, "logging started");

    Ok(())
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1")
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
