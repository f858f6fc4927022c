//! Routes walked units to the control model.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ember_glow::{FieldFlags, GlowCommand, GlowConnection, GlowParameter, GlowRoot, GlowValue, Path};
use tracing::{debug, trace};

use crate::dynamic::DynamicPathHandler;
use crate::model::{Element, ElementKind, WriteOutcome};
use crate::projector;
use crate::resolver::{Resolution, ResolutionMut, resolve, resolve_mut};
use crate::session::{Session, SessionRegistry};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::invocation::{self, InvocationRequest};
use super::walker::{Unit, walk};

/// What to do once the model lock has been released.
enum Outcome<'a> {
    Done,
    Invoke(InvocationRequest),
    DelegateCommand(Arc<dyn DynamicPathHandler>, &'a GlowCommand),
    DelegateParameter(Arc<dyn DynamicPathHandler>, &'a GlowParameter),
    Dropped,
}

impl<'a> Outcome<'a> {
    fn command_miss(
        handler: Option<Arc<dyn DynamicPathHandler>>,
        command: &'a GlowCommand,
    ) -> Self {
        handler.map_or(Self::Dropped, |handler| Self::DelegateCommand(handler, command))
    }
}

/// Owns the control model and serves requests from every session.
///
/// The model sits behind one reader/writer lock. Directory requests and
/// invocations take the read side; parameter writes and matrix connects take
/// the write side. Replies and notifications are handed to the sessions before
/// the guard is released, so a session never sees a directory snapshot that is
/// older than a connection change it has already been told about.
pub struct Dispatcher {
    model: RwLock<Element>,
    sessions: Arc<SessionRegistry>,
}

impl Dispatcher {
    /// Builds a dispatcher over `root` with an empty session registry.
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self::with_registry(root, Arc::new(SessionRegistry::new()))
    }

    /// Builds a dispatcher over `root` sharing `sessions`.
    #[must_use]
    pub fn with_registry(root: Element, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            model: RwLock::new(root),
            sessions,
        }
    }

    /// Registry of the sessions served by this dispatcher.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Runs `inspect` against the model under the read lock.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Internal`] when the model lock is poisoned.
    pub fn with_model<R>(&self, inspect: impl FnOnce(&Element) -> R) -> Result<R, DispatchError> {
        let model = self.read()?;
        Ok(inspect(&model))
    }

    /// Handles every unit of an inbound message on behalf of `session`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the model lock is poisoned or an
    /// invocation worker cannot be started. Protocol problems are never
    /// errors.
    pub fn dispatch(&self, root: &GlowRoot, session: &Arc<Session>) -> Result<(), DispatchError> {
        for unit in walk(root) {
            self.dispatch_unit(unit, session)?;
        }
        Ok(())
    }

    fn dispatch_unit(&self, unit: Unit<'_>, session: &Arc<Session>) -> Result<(), DispatchError> {
        trace!(target: DISPATCH_TARGET, session = %session.id(), ?unit, "dispatching unit");
        let outcome = match &unit {
            Unit::GetDirectory { path, command } => self.get_directory(path, command, session)?,
            Unit::Unsubscribe { path, command } => self.unsubscribe(path, command, session)?,
            Unit::Invoke { path, command } => self.invoke(path, command)?,
            Unit::ParameterWrite { path, parameter } => self.write_parameter(path, parameter)?,
            Unit::MatrixConnect { path, connections } => {
                self.connect(path, connections)?;
                Outcome::Done
            }
        };
        let path = unit.path();
        match outcome {
            Outcome::Done => {}
            Outcome::Invoke(request) => {
                invocation::spawn(request, Arc::clone(session), Arc::clone(&self.sessions))?;
            }
            Outcome::DelegateCommand(handler, command) => {
                handler.handle_command(command, path, session);
            }
            Outcome::DelegateParameter(handler, parameter) => {
                handler.handle_parameter(parameter, path, session);
            }
            Outcome::Dropped => {
                trace!(target: DISPATCH_TARGET, path = %path, "dropping unresolved request");
            }
        }
        Ok(())
    }

    fn get_directory<'a>(
        &self,
        path: &Path,
        command: &'a GlowCommand,
        session: &Session,
    ) -> Result<Outcome<'a>, DispatchError> {
        let model = self.read()?;
        let element = match resolve(&model, path) {
            Resolution::Found(element) => element,
            Resolution::Missing(handler) => return Ok(Outcome::command_miss(handler, command)),
        };
        let fields = FieldFlags::from_wire(command.dir_field_mask);
        let elements = projector::directory(element, path, fields);
        if matches!(element.kind(), ElementKind::Matrix(_)) && session.subscribe(path) {
            debug!(
                target: DISPATCH_TARGET,
                session = %session.id(),
                matrix = %path,
                "session subscribed to matrix"
            );
        }
        // Connects need the write guard, so no diff can slip in ahead of this.
        self.sessions.deliver(session, &GlowRoot { elements });
        Ok(Outcome::Done)
    }

    fn unsubscribe<'a>(
        &self,
        path: &Path,
        command: &'a GlowCommand,
        session: &Session,
    ) -> Result<Outcome<'a>, DispatchError> {
        let model = self.read()?;
        match resolve(&model, path) {
            Resolution::Found(element) => {
                if matches!(element.kind(), ElementKind::Matrix(_)) && session.unsubscribe(path) {
                    debug!(
                        target: DISPATCH_TARGET,
                        session = %session.id(),
                        matrix = %path,
                        "session unsubscribed from matrix"
                    );
                }
                Ok(Outcome::Done)
            }
            Resolution::Missing(handler) => Ok(Outcome::command_miss(handler, command)),
        }
    }

    fn invoke<'a>(
        &self,
        path: &Path,
        command: &'a GlowCommand,
    ) -> Result<Outcome<'a>, DispatchError> {
        let model = self.read()?;
        match resolve(&model, path) {
            Resolution::Found(element) => match element.kind() {
                ElementKind::Function(function) => {
                    let invocation = command.invocation.clone().unwrap_or_default();
                    Ok(Outcome::Invoke(InvocationRequest::new(
                        path.clone(),
                        function,
                        invocation.invocation_id,
                        invocation.arguments,
                    )))
                }
                _ => Ok(Outcome::Dropped),
            },
            Resolution::Missing(handler) => Ok(Outcome::command_miss(handler, command)),
        }
    }

    fn write_parameter<'a>(
        &self,
        path: &Path,
        parameter: &'a GlowParameter,
    ) -> Result<Outcome<'a>, DispatchError> {
        let Some(value) = parameter.value.as_ref() else {
            return Ok(Outcome::Done);
        };
        let mut model = self.write()?;
        let target = match resolve_mut(&mut model, path) {
            ResolutionMut::Found(element) => element,
            ResolutionMut::Missing(handler) => {
                return Ok(handler.map_or(Outcome::Dropped, |handler| {
                    Outcome::DelegateParameter(handler, parameter)
                }));
            }
        };
        let ElementKind::Parameter(target) = target.kind_mut() else {
            return Ok(Outcome::Dropped);
        };
        let outcome = target.write_remote(value);
        trace!(target: DISPATCH_TARGET, path = %path, ?outcome, "parameter write");
        if outcome.is_changed() {
            self.sessions.broadcast(&projector::value_update(path, target.value()));
        }
        Ok(Outcome::Done)
    }

    fn connect(&self, path: &Path, connections: &[GlowConnection]) -> Result<(), DispatchError> {
        let mut model = self.write()?;
        let ResolutionMut::Found(element) = resolve_mut(&mut model, path) else {
            trace!(target: DISPATCH_TARGET, path = %path, "dropping connect to unresolved matrix");
            return Ok(());
        };
        let ElementKind::Matrix(matrix) = element.kind_mut() else {
            return Ok(());
        };

        let mut affected: Vec<u32> = Vec::new();
        for connection in connections {
            let sources = connection.sources.as_deref().unwrap_or_default();
            let operation = connection.operation.unwrap_or_default();
            let Some(targets) = matrix.connect(connection.target, sources, operation) else {
                trace!(
                    target: DISPATCH_TARGET,
                    matrix = %path,
                    connection_target = connection.target,
                    "ignoring connection with unknown target or sources"
                );
                continue;
            };
            for target in targets {
                if !affected.contains(&target) {
                    affected.push(target);
                }
            }
        }
        if affected.is_empty() {
            return Ok(());
        }

        let diff = projector::connection_diff(matrix, path, &affected);
        let delivered = self.sessions.broadcast_to_subscribers(path, &diff);
        debug!(
            target: DISPATCH_TARGET,
            matrix = %path,
            targets = ?affected,
            subscribers = delivered,
            "matrix connections changed"
        );
        Ok(())
    }

    /// Pushes the current value of the parameter at `path` to every session.
    ///
    /// Call this after the device changed a parameter on its own.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownParameter`] when `path` does not name a
    /// parameter.
    pub fn notify_parameter_value_changed(&self, path: &Path) -> Result<(), DispatchError> {
        let model = self.read()?;
        match resolve(&model, path) {
            Resolution::Found(element) => match element.kind() {
                ElementKind::Parameter(parameter) => {
                    self.sessions.broadcast(&projector::value_update(path, parameter.value()));
                    Ok(())
                }
                _ => Err(DispatchError::UnknownParameter { path: path.clone() }),
            },
            Resolution::Missing(_) => Err(DispatchError::UnknownParameter { path: path.clone() }),
        }
    }

    /// Pushes `value` for a parameter that lives outside the model tree, such
    /// as one served by a dynamic handler.
    pub fn notify_dynamic_parameter_value(&self, path: &Path, value: GlowValue) {
        self.sessions.broadcast(&projector::value_update(path, value));
    }

    /// Applies a device-side write and pushes the new value when it changed.
    ///
    /// Unlike controller writes this ignores the writable flag.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownParameter`] when `path` does not name a
    /// parameter.
    pub fn update_parameter(
        &self,
        path: &Path,
        value: &GlowValue,
    ) -> Result<WriteOutcome, DispatchError> {
        let mut model = self.write()?;
        let ResolutionMut::Found(element) = resolve_mut(&mut model, path) else {
            return Err(DispatchError::UnknownParameter { path: path.clone() });
        };
        let ElementKind::Parameter(parameter) = element.kind_mut() else {
            return Err(DispatchError::UnknownParameter { path: path.clone() });
        };
        let outcome = parameter.set_value(value);
        if outcome.is_changed() {
            self.sessions.broadcast(&projector::value_update(path, parameter.value()));
        }
        Ok(outcome)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Element>, DispatchError> {
        self.model.read().map_err(|_| DispatchError::poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Element>, DispatchError> {
        self.model.write().map_err(|_| DispatchError::poisoned())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Dispatcher")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}
