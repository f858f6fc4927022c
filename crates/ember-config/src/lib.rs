//! Shared configuration for the Ember+ provider daemon.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an optional
//! configuration file, then `EMBER_*` environment variables, then command-line
//! flags. The resulting [`Config`] carries the listener endpoint, the logging
//! setup, and the inbound frame size limit.

mod defaults;
mod endpoint;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_FRAME_BYTES, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT,
    default_listen_endpoint, default_log_filter, default_log_filter_string, default_log_format,
    default_max_frame_bytes,
};
pub use endpoint::{EndpointParseError, ProviderEndpoint};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "EMBER")]
pub struct Config {
    /// Endpoint controllers connect to.
    #[serde(default = "default_listen_endpoint")]
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: ProviderEndpoint,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Largest accepted inbound frame in bytes.
    #[serde(default = "default_max_frame_bytes")]
    #[ortho_config(default = default_max_frame_bytes())]
    pub max_frame_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl Config {
    /// Endpoint the provider binds.
    #[must_use]
    pub fn listen(&self) -> &ProviderEndpoint {
        &self.listen
    }

    /// Filter expression handed to the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for log records.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Upper bound for one inbound frame.
    #[must_use]
    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }
}
