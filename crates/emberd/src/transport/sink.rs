//! Session sink feeding a per-connection writer thread.
//!
//! The dispatcher delivers replies and notifications while it holds the model
//! lock. Sending therefore only encodes the tree and queues the frame; a
//! dedicated thread performs the blocking socket writes. A controller that
//! stops reading fills its queue and is disconnected instead of stalling
//! everyone else.

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread;

use ember_glow::{Codec, GlowRoot};
use tracing::debug;

use crate::session::{OutputSink, SinkError};

use super::TRANSPORT_TARGET;

/// Frames a session may have in flight before it counts as stalled.
pub(crate) const OUTBOUND_QUEUE_DEPTH: usize = 256;

pub(crate) struct QueuedSink {
    frames: Option<SyncSender<Vec<u8>>>,
    control: TcpStream,
    codec: Arc<dyn Codec>,
}

impl QueuedSink {
    /// Starts the writer thread for `stream`.
    pub(crate) fn spawn(
        stream: TcpStream,
        codec: Arc<dyn Codec>,
        depth: usize,
    ) -> io::Result<Self> {
        let control = stream.try_clone()?;
        let (frames, queue) = mpsc::sync_channel(depth);
        thread::Builder::new()
            .name("emberd-writer".to_owned())
            .spawn(move || drain(stream, &queue))?;
        Ok(Self::from_parts(frames, control, codec))
    }

    fn from_parts(frames: SyncSender<Vec<u8>>, control: TcpStream, codec: Arc<dyn Codec>) -> Self {
        Self {
            frames: Some(frames),
            control,
            codec,
        }
    }
}

fn drain(mut stream: TcpStream, queue: &Receiver<Vec<u8>>) {
    for frame in queue {
        if let Err(error) = stream.write_all(&frame).and_then(|()| stream.flush()) {
            debug!(target: TRANSPORT_TARGET, error = %error, "connection write failed");
            shut_down(&stream);
            return;
        }
    }
}

fn shut_down(stream: &TcpStream) {
    // Shutting down both halves also wakes the connection's reader.
    match stream.shutdown(Shutdown::Both) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotConnected => {}
        Err(error) => {
            debug!(target: TRANSPORT_TARGET, error = %error, "socket shutdown failed");
        }
    }
}

impl OutputSink for QueuedSink {
    fn send(&mut self, root: &GlowRoot) -> Result<(), SinkError> {
        let Some(frames) = self.frames.as_ref() else {
            return Err(SinkError::Disconnected);
        };
        let frame = self.codec.encode(root)?;
        frames.try_send(frame).map_err(|error| match error {
            TrySendError::Full(_) => SinkError::Backlogged,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        })
    }

    fn close(&mut self) {
        self.frames = None;
        shut_down(&self.control);
    }
}
