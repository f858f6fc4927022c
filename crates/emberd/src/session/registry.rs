//! Registry of live sessions and fan-out delivery.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use ember_glow::{GlowRoot, Path};
use tracing::{debug, warn};

use super::{OutputSink, SESSION_TARGET, Session, SessionError, SessionId, recover};

/// Set of connected sessions.
///
/// The registry lock is only held while the session map is read or changed;
/// writes to the sessions themselves happen on a snapshot.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session around `sink`.
    pub fn open(&self, sink: Box<dyn OutputSink>, peer: Option<SocketAddr>) -> Arc<Session> {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let session = Arc::new(Session::new(id, peer, sink));
        recover(self.sessions.lock()).insert(id, Arc::clone(&session));
        debug!(target: SESSION_TARGET, session = %id, ?peer, "session opened");
        session
    }

    /// Closes the session and removes it from the registry.
    ///
    /// Returns `true` when the session was still registered.
    pub fn close(&self, id: SessionId) -> bool {
        let removed = recover(self.sessions.lock()).remove(&id);
        match removed {
            Some(session) => {
                session.close();
                debug!(target: SESSION_TARGET, session = %id, "session closed");
                true
            }
            None => false,
        }
    }

    /// The live session with `id`.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        recover(self.sessions.lock()).get(&id).cloned()
    }

    /// Writes `root` to `session`, dropping the session when delivery fails.
    ///
    /// Returns whether the message was delivered.
    pub fn deliver(&self, session: &Session, root: &GlowRoot) -> bool {
        match session.write(root) {
            Ok(()) => true,
            Err(SessionError::Closed) => {
                self.close(session.id());
                false
            }
            Err(SessionError::Send(error)) => {
                warn!(
                    target: SESSION_TARGET,
                    session = %session.id(),
                    error = %error,
                    "closing session after failed delivery"
                );
                self.close(session.id());
                false
            }
        }
    }

    /// Sends `root` to every live session.
    pub fn broadcast(&self, root: &GlowRoot) {
        for session in self.snapshot() {
            self.deliver(&session, root);
        }
    }

    /// Sends `root` to every session subscribed to the matrix at `matrix`.
    ///
    /// Returns the number of sessions that received the message.
    pub fn broadcast_to_subscribers(&self, matrix: &Path, root: &GlowRoot) -> usize {
        self.snapshot()
            .into_iter()
            .filter(|session| session.is_subscribed(matrix))
            .filter(|session| self.deliver(session, root))
            .count()
    }

    /// Closes every session.
    pub fn close_all(&self) {
        let drained: Vec<_> = recover(self.sessions.lock()).drain().collect();
        for (id, session) in drained {
            session.close();
            debug!(target: SESSION_TARGET, session = %id, "session closed during shutdown");
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        recover(self.sessions.lock()).len()
    }

    /// Whether no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<Session>> {
        let mut sessions: Vec<_> = recover(self.sessions.lock()).values().cloned().collect();
        sessions.sort_by_key(|session| session.id());
        sessions
    }
}
