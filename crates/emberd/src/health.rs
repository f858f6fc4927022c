//! Structured health reporting for provider lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use ember_config::Config;

use crate::bootstrap::BootstrapError;
use crate::session::SessionId;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the listener accepts connections.
    fn listener_ready(&self, local_addr: SocketAddr);

    /// Invoked when a controller connects.
    fn session_opened(&self, id: SessionId, peer: Option<SocketAddr>);

    /// Invoked when a controller connection ends.
    fn session_closed(&self, id: SessionId);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, local_addr: SocketAddr) {
        (**self).listener_ready(local_addr);
    }

    fn session_opened(&self, id: SessionId, peer: Option<SocketAddr>) {
        (**self).session_opened(id, peer);
    }

    fn session_closed(&self, id: SessionId) {
        (**self).session_closed(id);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting provider bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            max_frame_bytes = config.max_frame_bytes(),
            "provider bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "provider bootstrap failed"
        );
    }

    fn listener_ready(&self, local_addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            local_addr = %local_addr,
            "accepting controller connections"
        );
    }

    fn session_opened(&self, id: SessionId, peer: Option<SocketAddr>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_opened",
            session = %id,
            peer = ?peer,
            "controller connected"
        );
    }

    fn session_closed(&self, id: SessionId) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_closed",
            session = %id,
            "controller disconnected"
        );
    }
}
