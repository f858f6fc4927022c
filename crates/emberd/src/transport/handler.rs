//! Connection handling for the provider listener.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use ember_glow::{Codec, DecodeError};
use tracing::{debug, trace, warn};

use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::session::Session;

use super::TRANSPORT_TARGET;
use super::frames::{Frame, FrameReader};
use super::sink::{OUTBOUND_QUEUE_DEPTH, QueuedSink};

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection until it ends. Implementations should
    /// avoid panicking.
    fn handle(&self, stream: TcpStream);
}

/// Serves one controller: every decoded frame goes to the dispatcher, and the
/// session lives exactly as long as the connection.
pub(crate) struct ProviderConnectionHandler {
    dispatcher: Arc<Dispatcher>,
    codec: Arc<dyn Codec>,
    reporter: Arc<dyn HealthReporter>,
    max_frame_bytes: usize,
}

impl ProviderConnectionHandler {
    pub(crate) fn new(
        dispatcher: Arc<Dispatcher>,
        codec: Arc<dyn Codec>,
        reporter: Arc<dyn HealthReporter>,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            dispatcher,
            codec,
            reporter,
            max_frame_bytes,
        }
    }

    fn serve(&self, frames: &mut FrameReader<TcpStream>, session: &Arc<Session>) {
        while !session.is_closed() {
            match frames.next_frame() {
                Ok(Frame::Complete(bytes)) => self.handle_frame(&bytes, session),
                Ok(Frame::Oversized { size }) => {
                    warn!(
                        target: TRANSPORT_TARGET,
                        session = %session.id(),
                        size,
                        limit = self.max_frame_bytes,
                        "discarding oversized frame"
                    );
                }
                Ok(Frame::EndOfStream) => break,
                Err(error) => {
                    debug!(
                        target: TRANSPORT_TARGET,
                        session = %session.id(),
                        error = %error,
                        "connection read failed"
                    );
                    break;
                }
            }
        }
    }

    fn handle_frame(&self, bytes: &[u8], session: &Arc<Session>) {
        let root = match self.codec.decode(bytes) {
            Ok(root) => root,
            Err(DecodeError::Empty) => {
                trace!(target: TRANSPORT_TARGET, session = %session.id(), "empty frame");
                return;
            }
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    session = %session.id(),
                    error = %error,
                    "discarding undecodable frame"
                );
                return;
            }
        };
        if let Err(error) = self.dispatcher.dispatch(&root, session) {
            warn!(
                target: TRANSPORT_TARGET,
                session = %session.id(),
                error = %error,
                "dispatch failed"
            );
        }
    }
}

impl ConnectionHandler for ProviderConnectionHandler {
    fn handle(&self, stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        let writer = match stream.try_clone() {
            Ok(writer) => writer,
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    peer = ?peer,
                    error = %error,
                    "failed to clone connection for writing"
                );
                return;
            }
        };
        if let Err(error) = writer.set_write_timeout(Some(WRITE_TIMEOUT)) {
            debug!(target: TRANSPORT_TARGET, error = %error, "failed to set write timeout");
        }

        let sink = match QueuedSink::spawn(writer, Arc::clone(&self.codec), OUTBOUND_QUEUE_DEPTH) {
            Ok(sink) => sink,
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    peer = ?peer,
                    error = %error,
                    "failed to start connection writer"
                );
                return;
            }
        };

        let sessions = self.dispatcher.sessions();
        let session = sessions.open(Box::new(sink), peer);
        self.reporter.session_opened(session.id(), peer);

        let mut frames = FrameReader::new(stream, self.codec.delimiter(), self.max_frame_bytes);
        self.serve(&mut frames, &session);

        sessions.close(session.id());
        self.reporter.session_closed(session.id());
    }
}
