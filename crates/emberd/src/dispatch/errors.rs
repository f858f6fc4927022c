//! Error types for request dispatch.
//!
//! Protocol-level problems such as unknown paths or mistyped writes are never
//! errors: the provider drops them silently. The variants here describe
//! failures of the provider itself.

use std::io;

use ember_glow::Path;
use thiserror::Error;

/// Errors surfaced by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Internal error (e.g., lock poisoned).
    #[error("internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },

    /// The invocation worker thread could not be started.
    #[error("failed to start invocation worker: {0}")]
    InvocationSpawn(#[source] io::Error),

    /// A device-side update addressed something other than a parameter.
    #[error("no parameter at path '{path}'")]
    UnknownParameter {
        /// Requested path.
        path: Path,
    },
}

impl DispatchError {
    pub(crate) fn poisoned() -> Self {
        Self::Internal {
            message: "model lock poisoned".to_owned(),
        }
    }
}
