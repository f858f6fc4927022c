//! Per-connection session state and output delivery.
//!
//! A [`Session`] owns the output sink of one controller connection together
//! with the set of matrix paths it is subscribed to. Matrices never hold back
//! references to sessions: subscription membership lives only here, so closing
//! a session drops it from every subscriber set at once.

mod registry;

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::{LockResult, Mutex, MutexGuard, PoisonError};

use ember_glow::{EncodeError, GlowRoot, Path};
use thiserror::Error;

pub use registry::SessionRegistry;

pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Failure reported by an output sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The tree could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Writing to the connection failed.
    #[error("failed to write frame: {0}")]
    Io(#[from] io::Error),
    /// The peer is not keeping up and its outbound queue is full.
    #[error("outbound queue is full")]
    Backlogged,
    /// The connection writer has stopped.
    #[error("connection writer has stopped")]
    Disconnected,
}

/// Errors surfaced by [`Session::write`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session has been closed.
    #[error("session is closed")]
    Closed,
    /// The sink rejected the message.
    #[error("failed to deliver message: {0}")]
    Send(#[from] SinkError),
}

/// Outbound endpoint of a session.
pub trait OutputSink: Send {
    /// Delivers one wire tree.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the tree cannot be encoded or written.
    fn send(&mut self, root: &GlowRoot) -> Result<(), SinkError>;

    /// Releases the endpoint. Called at most once.
    fn close(&mut self);
}

/// Process-unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "session-{}", self.0)
    }
}

/// One connected controller.
///
/// The sink and the subscription set sit behind separate mutexes so a
/// broadcast writing to the session never waits on subscription changes, and
/// `close` may run while a broadcast is in flight.
pub struct Session {
    id: SessionId,
    peer: Option<SocketAddr>,
    sink: Mutex<Option<Box<dyn OutputSink>>>,
    subscriptions: Mutex<HashSet<Path>>,
}

fn recover<'a, T>(result: LockResult<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub(crate) fn new(id: SessionId, peer: Option<SocketAddr>, sink: Box<dyn OutputSink>) -> Self {
        Self {
            id,
            peer,
            sink: Mutex::new(Some(sink)),
            subscriptions: Mutex::new(HashSet::new()),
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Remote address, when the transport knows it.
    #[must_use]
    pub const fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Subscribes to connection changes of the matrix at `matrix`.
    ///
    /// Returns `false` when the session was already subscribed or is closed.
    pub fn subscribe(&self, matrix: &Path) -> bool {
        if self.is_closed() {
            return false;
        }
        recover(self.subscriptions.lock()).insert(matrix.clone())
    }

    /// Removes the subscription to `matrix`. Returns whether one existed.
    pub fn unsubscribe(&self, matrix: &Path) -> bool {
        recover(self.subscriptions.lock()).remove(matrix)
    }

    /// Whether the session is subscribed to `matrix`.
    #[must_use]
    pub fn is_subscribed(&self, matrix: &Path) -> bool {
        recover(self.subscriptions.lock()).contains(matrix)
    }

    /// Snapshot of the subscribed matrix paths.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Path> {
        recover(self.subscriptions.lock()).iter().cloned().collect()
    }

    /// Sends one wire tree through the sink.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] after [`Session::close`] and
    /// [`SessionError::Send`] when the sink fails.
    pub fn write(&self, root: &GlowRoot) -> Result<(), SessionError> {
        let mut sink = recover(self.sink.lock());
        let Some(sink) = sink.as_mut() else {
            return Err(SessionError::Closed);
        };
        sink.send(root)?;
        Ok(())
    }

    /// Releases the sink and clears every subscription.
    ///
    /// Returns `true` for the call that actually closed the session.
    pub fn close(&self) -> bool {
        let sink = recover(self.sink.lock()).take();
        recover(self.subscriptions.lock()).clear();
        match sink {
            Some(mut sink) => {
                sink.close();
                true
            }
            None => false,
        }
    }

    /// Whether [`Session::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        recover(self.sink.lock()).is_none()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
