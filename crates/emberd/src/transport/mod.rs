//! TCP transport for controller connections.
//!
//! The listener accepts connections on a background thread and hands each one
//! to a [`ConnectionHandler`] on its own thread. The provider handler turns the
//! byte stream into delimited frames, decodes them with the configured codec,
//! and feeds the resulting trees to the dispatcher.

mod errors;
mod frames;
mod handler;
mod listener;
mod sink;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ProviderConnectionHandler};
pub(crate) use self::listener::{ListenerHandle, SocketListener};

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
