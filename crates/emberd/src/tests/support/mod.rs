//! Shared harness for the behavioural suites and the inline unit tests.

mod handler;
mod model;
mod reporter;
pub(crate) mod requests;
mod sinks;

use std::time::{Duration, Instant};

pub(crate) use handler::MockPathHandler;
pub(crate) use model::{
    ADD, DEVICE, EXPLODE, EXTERNAL, GAIN, Harness, LABELS, MESH, MUTE, NAME, ROUTER, SERIAL,
    fixture_tree, harness,
};
pub(crate) use reporter::{HealthEvent, RecordingHealthReporter};
pub(crate) use sinks::{FailingSink, RecordingSink};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Polls `condition` until it holds or two seconds pass.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}
