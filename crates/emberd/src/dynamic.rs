//! Fallback handlers for paths outside the materialized tree.
//!
//! A node may own a subtree that is expanded lazily or managed elsewhere. When
//! a request addresses a path below such a node that does not resolve, the
//! dispatcher hands the request to the handler registered on the deepest node
//! it did reach. Handlers run after the model lock is released, so they may
//! call back into the dispatcher.

use std::sync::Arc;

use ember_glow::{GlowCommand, GlowParameter, Path};

use crate::session::Session;

/// Capability object attached to a node and consulted on resolution misses.
pub trait DynamicPathHandler: Send + Sync {
    /// Handles a command addressed to `path`.
    fn handle_command(&self, command: &GlowCommand, path: &Path, session: &Arc<Session>);

    /// Handles a parameter write addressed to `path`.
    fn handle_parameter(&self, parameter: &GlowParameter, path: &Path, session: &Arc<Session>);
}
