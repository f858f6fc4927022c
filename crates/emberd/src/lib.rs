//! Ember+ style provider core.
//!
//! The provider exposes a device's control model (nodes, parameters, routing
//! matrices and functions) to remote controllers over persistent TCP
//! connections. Each connection is a [`Session`]. Inbound wire trees are
//! flattened into addressed units and handed to the [`Dispatcher`], which
//! resolves them against the model, mutates it, and pushes state changes to
//! the sessions that need them:
//!
//! - parameter value changes go to every session;
//! - matrix connection changes go to the sessions subscribed to that matrix,
//!   where a directory request on a matrix subscribes the requester;
//! - invocation results go only to the requesting session.
//!
//! The binary serves the [`sample_device`] over the JSON-lines codec from
//! [`ember_glow`]. Embedding applications build their own tree with the
//! [`model`] types and call [`bootstrap_with`].

mod bootstrap;
pub mod dispatch;
pub mod dynamic;
mod health;
pub mod model;
mod process;
pub mod projector;
pub mod resolver;
pub mod sample_device;
mod session;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Provider, ServingHandle, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use dispatch::{DispatchError, Dispatcher};
pub use dynamic::DynamicPathHandler;
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_provider,
    run_provider_with,
};
pub use session::{OutputSink, Session, SessionError, SessionId, SessionRegistry, SinkError};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
