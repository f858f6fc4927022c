//! In-memory control model exposed to controllers.
//!
//! The tree is a tagged union over nodes, parameters, matrices and functions.
//! A parent owns its children outright; an element's path is never stored but
//! derived from the numbers walked from the root, which keeps the tree free of
//! back references.

mod function;
mod matrix;
mod parameter;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dynamic::DynamicPathHandler;

pub use function::{Function, FunctionAction, InvocationError, TupleItem};
pub use matrix::{Matrix, MatrixKind, Signal};
pub use parameter::{IntegerParameter, Parameter, ParameterKind, WriteOutcome};

/// Errors raised while assembling the control model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The identifier breaks the naming rules.
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// Rejected identifier.
        identifier: String,
        /// Rule that was broken.
        reason: &'static str,
    },
    /// A sibling already uses the number.
    #[error("element '{parent}' already has a child numbered {number}")]
    DuplicateNumber {
        /// Identifier of the parent node.
        parent: String,
        /// Conflicting number.
        number: u32,
    },
    /// Children can only be added to nodes.
    #[error("element '{identifier}' is not a node")]
    NotANode {
        /// Identifier of the offending element.
        identifier: String,
    },
    /// A matrix signal number appears twice in one collection.
    #[error("matrix signal {number} is declared twice")]
    DuplicateSignal {
        /// Conflicting signal number.
        number: u32,
    },
    /// Integer bounds are inverted or exclude the initial value.
    #[error("integer value {value} is outside [{minimum}, {maximum}]")]
    InvalidBounds {
        /// Initial value.
        value: i64,
        /// Lower bound.
        minimum: i64,
        /// Upper bound.
        maximum: i64,
    },
}

/// Checks an identifier against the naming rules.
///
/// Identifiers must be non-empty, start with an ASCII letter or an underscore,
/// and must not contain `/`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidIdentifier`] naming the violated rule.
pub fn validate_identifier(identifier: &str) -> Result<(), ModelError> {
    let reason = match identifier.chars().next() {
        None => Some("identifier must not be empty"),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
            Some("identifier must begin with a letter or underscore")
        }
        Some(_) if identifier.contains('/') => Some("identifier must not contain '/'"),
        Some(_) => None,
    };
    match reason {
        Some(reason) => Err(ModelError::InvalidIdentifier {
            identifier: identifier.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Kind-specific payload of an [`Element`].
#[derive(Debug)]
pub enum ElementKind {
    /// Structural node.
    Node(Node),
    /// Typed parameter.
    Parameter(Parameter),
    /// Routing matrix.
    Matrix(Matrix),
    /// Invokable function.
    Function(Function),
}

impl From<Node> for ElementKind {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl From<Parameter> for ElementKind {
    fn from(value: Parameter) -> Self {
        Self::Parameter(value)
    }
}

impl From<Matrix> for ElementKind {
    fn from(value: Matrix) -> Self {
        Self::Matrix(value)
    }
}

impl From<Function> for ElementKind {
    fn from(value: Function) -> Self {
        Self::Function(value)
    }
}

/// One addressable entry of the control model.
#[derive(Debug)]
pub struct Element {
    number: u32,
    identifier: String,
    description: Option<String>,
    schema_identifier: Option<String>,
    kind: ElementKind,
}

impl Element {
    /// Builds an element after validating its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidIdentifier`] for malformed identifiers.
    pub fn new(
        number: u32,
        identifier: impl Into<String>,
        kind: impl Into<ElementKind>,
    ) -> Result<Self, ModelError> {
        let identifier = identifier.into();
        validate_identifier(&identifier)?;
        Ok(Self {
            number,
            identifier,
            description: None,
            schema_identifier: None,
            kind: kind.into(),
        })
    }

    /// Builds an empty node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidIdentifier`] for malformed identifiers.
    pub fn node(number: u32, identifier: impl Into<String>) -> Result<Self, ModelError> {
        Self::new(number, identifier, Node::new())
    }

    /// The root node. It is never addressed by number; the empty path resolves
    /// to it.
    #[must_use]
    pub fn root() -> Self {
        Self {
            number: 0,
            identifier: "root".to_owned(),
            description: None,
            schema_identifier: None,
            kind: ElementKind::Node(Node::new()),
        }
    }

    /// Sets the description; an empty string clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    /// Sets the schema identifier; an empty string clears it.
    #[must_use]
    pub fn with_schema_identifier(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.schema_identifier = (!schema.is_empty()).then_some(schema);
        self
    }

    /// Appends a child, consuming and returning `self` for chaining.
    ///
    /// # Errors
    ///
    /// Fails when `self` is not a node or the child's number is taken.
    pub fn with_child(mut self, child: Self) -> Result<Self, ModelError> {
        self.push_child(child)?;
        Ok(self)
    }

    /// Appends a child.
    ///
    /// # Errors
    ///
    /// Fails when `self` is not a node or the child's number is taken.
    pub fn push_child(&mut self, child: Self) -> Result<(), ModelError> {
        let ElementKind::Node(node) = &mut self.kind else {
            return Err(ModelError::NotANode {
                identifier: self.identifier.clone(),
            });
        };
        if node.child(child.number).is_some() {
            return Err(ModelError::DuplicateNumber {
                parent: self.identifier.clone(),
                number: child.number,
            });
        }
        node.children.push(child);
        Ok(())
    }

    /// Attaches a fallback handler for paths below this node that do not
    /// resolve inside the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotANode`] when `self` is not a node.
    pub fn with_dynamic_handler(
        mut self,
        handler: Arc<dyn DynamicPathHandler>,
    ) -> Result<Self, ModelError> {
        let ElementKind::Node(node) = &mut self.kind else {
            return Err(ModelError::NotANode {
                identifier: self.identifier,
            });
        };
        node.dynamic_handler = Some(handler);
        Ok(self)
    }

    /// Position identifier among the siblings.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Schema identifier, if any.
    #[must_use]
    pub fn schema_identifier(&self) -> Option<&str> {
        self.schema_identifier.as_deref()
    }

    /// Kind-specific payload.
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Mutable kind-specific payload.
    pub fn kind_mut(&mut self) -> &mut ElementKind {
        &mut self.kind
    }

    /// The node payload when this element is a node.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Node> {
        match &self.kind {
            ElementKind::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The child numbered `number` when this element is a node.
    #[must_use]
    pub fn child(&self, number: u32) -> Option<&Self> {
        self.as_node().and_then(|node| node.child(number))
    }

    /// Mutable child numbered `number` when this element is a node.
    pub fn child_mut(&mut self, number: u32) -> Option<&mut Self> {
        match &mut self.kind {
            ElementKind::Node(node) => node
                .children
                .iter_mut()
                .find(|child| child.number == number),
            _ => None,
        }
    }
}

/// Structural node payload.
#[derive(Default)]
pub struct Node {
    children: Vec<Element>,
    dynamic_handler: Option<Arc<dyn DynamicPathHandler>>,
}

impl Node {
    /// Builds a node without children.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// The child numbered `number`.
    #[must_use]
    pub fn child(&self, number: u32) -> Option<&Element> {
        self.children.iter().find(|child| child.number == number)
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Fallback handler registered on this node.
    #[must_use]
    pub fn dynamic_handler(&self) -> Option<&Arc<dyn DynamicPathHandler>> {
        self.dynamic_handler.as_ref()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Node")
            .field("children", &self.children)
            .field("dynamic_handler", &self.dynamic_handler.is_some())
            .finish()
    }
}
