//! Builders for inbound controller messages.

use ember_glow::{
    CommandType, ConnectionOperation, GlowCommand, GlowConnection, GlowFunction, GlowMatrix,
    GlowNode, GlowParameter, GlowRoot, GlowValue, Path,
};

/// Directory request addressed to `path`; the root when `path` is empty.
pub(crate) fn get_directory(path: &Path, mask: Option<i32>) -> GlowRoot {
    let command = GlowCommand {
        dir_field_mask: mask,
        ..GlowCommand::get_directory()
    };
    addressed(path, command)
}

pub(crate) fn unsubscribe(path: &Path) -> GlowRoot {
    addressed(path, GlowCommand::new(CommandType::Unsubscribe))
}

pub(crate) fn invoke(path: &Path, invocation_id: Option<i32>, arguments: Vec<GlowValue>) -> GlowRoot {
    GlowRoot::single(
        GlowFunction::qualified(path.clone())
            .with_child(GlowCommand::invoke(invocation_id, arguments)),
    )
}

pub(crate) fn write(path: &Path, value: impl Into<GlowValue>) -> GlowRoot {
    GlowRoot::single(GlowParameter::qualified(path.clone()).with_value(value))
}

/// Connect request with one entry per `(target, sources)` pair.
pub(crate) fn connect(
    path: &Path,
    operation: ConnectionOperation,
    entries: &[(u32, &[u32])],
) -> GlowRoot {
    let matrix = entries
        .iter()
        .fold(GlowMatrix::qualified(path.clone()), |matrix, (target, sources)| {
            matrix.with_connection(
                GlowConnection::new(*target)
                    .with_sources(sources.to_vec())
                    .with_operation(operation),
            )
        });
    GlowRoot::single(matrix)
}

fn addressed(path: &Path, command: GlowCommand) -> GlowRoot {
    if path.is_root() {
        GlowRoot::single(command)
    } else {
        GlowRoot::single(GlowNode::qualified(path.clone()).with_child(command))
    }
}
