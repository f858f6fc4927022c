//! Flattens an inbound wire tree into addressed units of work.
//!
//! Controllers may address elements in nested form, where each element
//! carries only its number and the path accumulates from the enclosing
//! elements, or in qualified form, where an element carries its full path.
//! Both forms may be mixed in one message.

use ember_glow::{
    CommandType, GlowCommand, GlowConnection, GlowElement, GlowParameter, GlowRoot, Path,
};

/// One request extracted from an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit<'a> {
    /// Directory request.
    GetDirectory {
        /// Addressed element.
        path: Path,
        /// Originating command.
        command: &'a GlowCommand,
    },
    /// Request to stop receiving connection changes.
    Unsubscribe {
        /// Addressed element.
        path: Path,
        /// Originating command.
        command: &'a GlowCommand,
    },
    /// Function call.
    Invoke {
        /// Addressed element.
        path: Path,
        /// Originating command.
        command: &'a GlowCommand,
    },
    /// Parameter write.
    ParameterWrite {
        /// Addressed element.
        path: Path,
        /// Parameter carrying the requested value.
        parameter: &'a GlowParameter,
    },
    /// Matrix cross-point changes.
    MatrixConnect {
        /// Addressed element.
        path: Path,
        /// Requested connections, never empty.
        connections: &'a [GlowConnection],
    },
}

impl Unit<'_> {
    /// Path addressed by the unit.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::GetDirectory { path, .. }
            | Self::Unsubscribe { path, .. }
            | Self::Invoke { path, .. }
            | Self::ParameterWrite { path, .. }
            | Self::MatrixConnect { path, .. } => path,
        }
    }
}

/// Extracts every unit of `root` in document order.
///
/// Commands at the top level address the root. Subscribe commands and
/// invocation results carry no work for a provider and are skipped.
#[must_use]
pub fn walk(root: &GlowRoot) -> Vec<Unit<'_>> {
    let mut units = Vec::new();
    let parent = Path::root();
    for element in &root.elements {
        visit(element, &parent, &mut units);
    }
    units
}

fn visit<'a>(element: &'a GlowElement, parent: &Path, units: &mut Vec<Unit<'a>>) {
    match element {
        GlowElement::Command(command) => {
            if let Some(unit) = command_unit(command, parent.clone()) {
                units.push(unit);
            }
        }
        GlowElement::Node(node) => {
            let path = node.address.resolve(parent);
            visit_children(&node.children, &path, units);
        }
        GlowElement::Parameter(parameter) => {
            let path = parameter.address.resolve(parent);
            if parameter.value.is_some() {
                units.push(Unit::ParameterWrite {
                    path: path.clone(),
                    parameter,
                });
            }
            visit_children(&parameter.children, &path, units);
        }
        GlowElement::Matrix(matrix) => {
            let path = matrix.address.resolve(parent);
            if let Some(connections) = matrix.connections.as_deref()
                && !connections.is_empty()
            {
                units.push(Unit::MatrixConnect {
                    path: path.clone(),
                    connections,
                });
            }
            visit_children(&matrix.children, &path, units);
        }
        GlowElement::Function(function) => {
            let path = function.address.resolve(parent);
            visit_children(&function.children, &path, units);
        }
        GlowElement::InvocationResult(_) => {}
    }
}

fn visit_children<'a>(children: &'a [GlowElement], path: &Path, units: &mut Vec<Unit<'a>>) {
    for child in children {
        visit(child, path, units);
    }
}

fn command_unit(command: &GlowCommand, path: Path) -> Option<Unit<'_>> {
    match command.number {
        CommandType::GetDirectory => Some(Unit::GetDirectory { path, command }),
        CommandType::Unsubscribe => Some(Unit::Unsubscribe { path, command }),
        CommandType::Invoke => Some(Unit::Invoke { path, command }),
        CommandType::Subscribe => None,
    }
}
