//! Output sinks that record or refuse traffic.

use std::io;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use ember_glow::GlowRoot;

use crate::session::{OutputSink, SinkError};

/// Sink capturing every delivered tree. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSink {
    messages: Arc<Mutex<Vec<GlowRoot>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn messages(&self) -> Vec<GlowRoot> {
        self.messages
            .lock()
            .expect("recording sink mutex poisoned")
            .clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl OutputSink for RecordingSink {
    fn send(&mut self, root: &GlowRoot) -> Result<(), SinkError> {
        self.messages
            .lock()
            .expect("recording sink mutex poisoned")
            .push(root.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Sink whose connection is always broken.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FailingSink;

impl OutputSink for FailingSink {
    fn send(&mut self, _root: &GlowRoot) -> Result<(), SinkError> {
        Err(SinkError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "peer went away",
        )))
    }

    fn close(&mut self) {}
}
