//! Path resolution against the control model.

use std::sync::Arc;

use ember_glow::Path;

use crate::dynamic::DynamicPathHandler;
use crate::model::Element;

/// Outcome of resolving a path.
pub enum Resolution<'a> {
    /// The path names an element.
    Found(&'a Element),
    /// The path does not resolve. Carries the handler registered on the
    /// deepest node that did resolve, if any.
    Missing(Option<Arc<dyn DynamicPathHandler>>),
}

/// Mutable counterpart of [`Resolution`].
pub enum ResolutionMut<'a> {
    /// The path names an element.
    Found(&'a mut Element),
    /// The path does not resolve.
    Missing(Option<Arc<dyn DynamicPathHandler>>),
}

fn handler_of(element: &Element) -> Option<Arc<dyn DynamicPathHandler>> {
    element
        .as_node()
        .and_then(|node| node.dynamic_handler().cloned())
}

/// Walks `path` from `root` one segment at a time.
///
/// The empty path resolves to `root` itself.
#[must_use]
pub fn resolve<'a>(root: &'a Element, path: &Path) -> Resolution<'a> {
    let mut current = root;
    for &segment in path.segments() {
        match current.child(segment) {
            Some(child) => current = child,
            None => return Resolution::Missing(handler_of(current)),
        }
    }
    Resolution::Found(current)
}

/// Walks `path` from `root`, yielding mutable access to the element.
#[must_use]
pub fn resolve_mut<'a>(root: &'a mut Element, path: &Path) -> ResolutionMut<'a> {
    let mut current = root;
    for &segment in path.segments() {
        if current.child(segment).is_none() {
            return ResolutionMut::Missing(handler_of(current));
        }
        match current.child_mut(segment) {
            Some(child) => current = child,
            None => return ResolutionMut::Missing(None),
        }
    }
    ResolutionMut::Found(current)
}
