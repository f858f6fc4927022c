//! Error surface for provider launch and supervision.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::model::ModelError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the provider process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The device model could not be built.
    #[error("invalid device model: {source}")]
    Model {
        /// Underlying model error.
        #[source]
        source: ModelError,
    },
    /// Bootstrapping the provider failed.
    #[error("provider bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Socket listener startup or shutdown failed.
    #[error("provider socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<ModelError> for LaunchError {
    fn from(source: ModelError) -> Self {
        Self::Model { source }
    }
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
