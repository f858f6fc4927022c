use crate::endpoint::ProviderEndpoint;
use crate::logging::LogFormat;

/// Default TCP port for Ember+ providers.
pub const DEFAULT_TCP_PORT: u16 = 9000;

/// Default bind address for the provider listener.
pub const DEFAULT_TCP_HOST: &str = "0.0.0.0";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default upper bound for a single inbound frame.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Computes the default listener endpoint.
pub fn default_listen_endpoint() -> ProviderEndpoint {
    ProviderEndpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
}

/// Default frame size limit.
pub fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}
