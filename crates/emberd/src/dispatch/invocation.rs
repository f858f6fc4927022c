//! Asynchronous function invocation.
//!
//! Each invocation runs on its own worker thread so a slow function body never
//! holds the model lock or stalls the connection that requested it. Failures
//! and panics are turned into `success = false` results at this boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use ember_glow::{GlowInvocationResult, GlowRoot, GlowValue, Path};
use tracing::{debug, warn};

use crate::model::{Function, FunctionAction, InvocationError};
use crate::session::{Session, SessionRegistry};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;

/// Everything a worker needs, captured while the model lock is held.
pub(crate) struct InvocationRequest {
    path: Path,
    invocation_id: Option<i32>,
    arguments: Vec<GlowValue>,
    action: Arc<dyn FunctionAction>,
    precheck: Result<(), InvocationError>,
}

impl InvocationRequest {
    pub(crate) fn new(
        path: Path,
        function: &Function,
        invocation_id: Option<i32>,
        arguments: Vec<GlowValue>,
    ) -> Self {
        let precheck = function.check_arguments(&arguments);
        Self {
            path,
            invocation_id,
            arguments,
            action: function.action(),
            precheck,
        }
    }

    fn run(self) -> (Path, Option<i32>, Result<Vec<GlowValue>, InvocationError>) {
        let Self {
            path,
            invocation_id,
            arguments,
            action,
            precheck,
        } = self;
        let outcome = precheck.and_then(|()| {
            panic::catch_unwind(AssertUnwindSafe(|| action.invoke(&arguments))).unwrap_or_else(
                |payload| {
                    Err(InvocationError::Panicked {
                        message: panic_message(&*payload),
                    })
                },
            )
        });
        (path, invocation_id, outcome)
    }
}

/// Starts `request` on a worker thread. The result is delivered to `session`
/// only.
pub(crate) fn spawn(
    request: InvocationRequest,
    session: Arc<Session>,
    sessions: Arc<SessionRegistry>,
) -> Result<(), DispatchError> {
    let name = format!("invoke-{}", request.path);
    thread::Builder::new()
        .name(name)
        .spawn(move || {
            let (path, invocation_id, outcome) = request.run();
            if let Err(error) = &outcome {
                warn!(
                    target: DISPATCH_TARGET,
                    path = %path,
                    invocation_id = ?invocation_id,
                    error = %error,
                    "invocation failed"
                );
            }
            let Some(invocation_id) = invocation_id else {
                debug!(
                    target: DISPATCH_TARGET,
                    path = %path,
                    "dropping result of invocation without id"
                );
                return;
            };
            let result = match outcome {
                Ok(values) => GlowInvocationResult::succeeded(invocation_id, values),
                Err(_) => GlowInvocationResult::failed(invocation_id),
            };
            sessions.deliver(&session, &GlowRoot::single(result));
        })
        .map(drop)
        .map_err(DispatchError::InvocationSpawn)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
