//! Wire element tree exchanged between controllers and the provider.
//!
//! Every element is addressed either by its `number` relative to an enclosing
//! element (nested form) or by a full [`Path`] from the root (qualified form).
//! Providers always answer in the qualified form; controllers may use either.

use serde::{Deserialize, Serialize};

use crate::path::Path;
use crate::value::{GlowAccess, GlowValue, ParameterType};

/// Top-level container for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowRoot {
    /// Elements in document order.
    #[serde(default)]
    pub elements: Vec<GlowElement>,
}

impl GlowRoot {
    /// Creates an empty root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root holding a single element.
    #[must_use]
    pub fn single(element: impl Into<GlowElement>) -> Self {
        Self {
            elements: vec![element.into()],
        }
    }

    /// Appends an element.
    pub fn push(&mut self, element: impl Into<GlowElement>) {
        self.elements.push(element.into());
    }

    /// Whether the root carries no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// How an element is located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Address {
    /// Position below the enclosing element.
    Number(u32),
    /// Full path from the root.
    Path(Path),
}

impl Default for Address {
    fn default() -> Self {
        Self::Path(Path::root())
    }
}

impl Address {
    /// Resolves this address against the path of the enclosing element.
    #[must_use]
    pub fn resolve(&self, parent: &Path) -> Path {
        match self {
            Self::Number(number) => parent.child(*number),
            Self::Path(path) => path.clone(),
        }
    }
}

/// Any element that can appear in a [`GlowRoot`] or below another element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlowElement {
    /// Structural node.
    Node(GlowNode),
    /// Typed parameter.
    Parameter(GlowParameter),
    /// Routing matrix.
    Matrix(GlowMatrix),
    /// Invokable function.
    Function(GlowFunction),
    /// Request addressed to the enclosing element.
    Command(GlowCommand),
    /// Outcome of an invocation.
    InvocationResult(GlowInvocationResult),
}

macro_rules! impl_into_element {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for GlowElement {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_into_element!(
    GlowNode => Node,
    GlowParameter => Parameter,
    GlowMatrix => Matrix,
    GlowFunction => Function,
    GlowCommand => Command,
    GlowInvocationResult => InvocationResult,
);

/// Node contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowNode {
    /// Location of the node.
    pub address: Address,
    /// Identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schema identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_identifiers: Option<String>,
    /// Nested elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GlowElement>,
}

impl GlowNode {
    /// Node addressed by a full path.
    #[must_use]
    pub fn qualified(path: Path) -> Self {
        Self {
            address: Address::Path(path),
            ..Self::default()
        }
    }

    /// Node addressed by its number below the enclosing element.
    #[must_use]
    pub fn numbered(number: u32) -> Self {
        Self {
            address: Address::Number(number),
            ..Self::default()
        }
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<GlowElement>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// Parameter contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowParameter {
    /// Location of the parameter.
    pub address: Address,
    /// Identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current (outbound) or requested (inbound) value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<GlowValue>,
    /// Lower bound for integer parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    /// Upper bound for integer parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    /// Access rights; absent means read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<GlowAccess>,
    /// Schema identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_identifiers: Option<String>,
    /// Nested elements (commands).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GlowElement>,
}

impl GlowParameter {
    /// Parameter addressed by a full path.
    #[must_use]
    pub fn qualified(path: Path) -> Self {
        Self {
            address: Address::Path(path),
            ..Self::default()
        }
    }

    /// Parameter addressed by its number below the enclosing element.
    #[must_use]
    pub fn numbered(number: u32) -> Self {
        Self {
            address: Address::Number(number),
            ..Self::default()
        }
    }

    /// Sets the value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<GlowValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<GlowElement>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// Matrix topology advertised to controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixType {
    /// Each target takes at most one source.
    OneToN,
    /// Each target and each source take part in at most one connection.
    OneToOne,
    /// Any target may take any number of sources.
    NToN,
}

/// Signal addressing scheme of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressingMode {
    /// Signals are numbered `0..count`.
    Linear,
    /// Signals carry arbitrary numbers listed explicitly.
    NonLinear,
}

/// Where per-signal parameters of a matrix live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParametersLocation {
    /// Node at the given path.
    BasePath(Path),
    /// Sub-identifier inline below the matrix.
    Inline(u32),
}

/// Reference to a labels node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowLabel {
    /// Path of the labels node.
    pub base_path: Path,
    /// Label set description.
    pub description: String,
}

/// Requested change to a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOperation {
    /// Replace the target's sources with the listed ones.
    #[default]
    Absolute,
    /// Add the listed sources.
    Connect,
    /// Remove the listed sources.
    Disconnect,
}

/// State of a reported connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDisposition {
    /// Current state, not the result of a request.
    Tally,
    /// Changed by a request.
    Modified,
    /// Change pending.
    Pending,
    /// Target is locked.
    Locked,
}

/// One target's connection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowConnection {
    /// Target signal number.
    pub target: u32,
    /// Connected (outbound) or requested (inbound) source numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<u32>>,
    /// Requested operation; absent means absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<ConnectionOperation>,
    /// Reported disposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<ConnectionDisposition>,
}

impl GlowConnection {
    /// Connection entry for `target` without sources.
    #[must_use]
    pub const fn new(target: u32) -> Self {
        Self {
            target,
            sources: None,
            operation: None,
            disposition: None,
        }
    }

    /// Sets the source list.
    #[must_use]
    pub fn with_sources(mut self, sources: impl Into<Vec<u32>>) -> Self {
        self.sources = Some(sources.into());
        self
    }

    /// Sets the requested operation.
    #[must_use]
    pub const fn with_operation(mut self, operation: ConnectionOperation) -> Self {
        self.operation = Some(operation);
        self
    }
}

/// Matrix contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowMatrix {
    /// Location of the matrix.
    pub address: Address,
    /// Identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Topology.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_type: Option<MatrixType>,
    /// Addressing scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressing_mode: Option<AddressingMode>,
    /// Declared number of targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_count: Option<u32>,
    /// Declared number of sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_count: Option<u32>,
    /// Location of per-signal parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_location: Option<ParametersLocation>,
    /// Number of the gain parameter within the signal parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_parameter_number: Option<u32>,
    /// Label node references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<GlowLabel>,
    /// Materialized target numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<u32>>,
    /// Materialized source numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<u32>>,
    /// Connection entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<GlowConnection>>,
    /// Schema identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_identifiers: Option<String>,
    /// Nested elements (commands).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GlowElement>,
}

impl GlowMatrix {
    /// Matrix addressed by a full path.
    #[must_use]
    pub fn qualified(path: Path) -> Self {
        Self {
            address: Address::Path(path),
            ..Self::default()
        }
    }

    /// Matrix addressed by its number below the enclosing element.
    #[must_use]
    pub fn numbered(number: u32) -> Self {
        Self {
            address: Address::Number(number),
            ..Self::default()
        }
    }

    /// Appends a connection entry, creating the list when absent.
    #[must_use]
    pub fn with_connection(mut self, connection: GlowConnection) -> Self {
        self.connections
            .get_or_insert_with(Vec::new)
            .push(connection);
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<GlowElement>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// Named, typed entry of a function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleItemDescription {
    /// Entry name.
    pub name: String,
    /// Entry type.
    pub value_type: ParameterType,
}

/// Function contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowFunction {
    /// Location of the function.
    pub address: Address,
    /// Identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Argument signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<TupleItemDescription>>,
    /// Result signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<TupleItemDescription>>,
    /// Nested elements (commands).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GlowElement>,
}

impl GlowFunction {
    /// Function addressed by a full path.
    #[must_use]
    pub fn qualified(path: Path) -> Self {
        Self {
            address: Address::Path(path),
            ..Self::default()
        }
    }

    /// Function addressed by its number below the enclosing element.
    #[must_use]
    pub fn numbered(number: u32) -> Self {
        Self {
            address: Address::Number(number),
            ..Self::default()
        }
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<GlowElement>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// Command identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// Subscribe to stream updates.
    Subscribe,
    /// Stop receiving updates for the addressed element.
    Unsubscribe,
    /// Enumerate the addressed element.
    GetDirectory,
    /// Run the addressed function.
    Invoke,
}

/// Arguments of one function call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowInvocation {
    /// Caller-chosen id echoed in the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<i32>,
    /// Argument values in signature order.
    #[serde(default)]
    pub arguments: Vec<GlowValue>,
}

/// Request addressed to the enclosing element (or the root at top level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowCommand {
    /// Command identifier.
    pub number: CommandType,
    /// Field mask for directory requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_field_mask: Option<i32>,
    /// Invocation payload for invoke commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation: Option<GlowInvocation>,
}

impl GlowCommand {
    /// Command without mask or invocation.
    #[must_use]
    pub const fn new(number: CommandType) -> Self {
        Self {
            number,
            dir_field_mask: None,
            invocation: None,
        }
    }

    /// Directory request with the default (all) mask.
    #[must_use]
    pub const fn get_directory() -> Self {
        Self::new(CommandType::GetDirectory)
    }

    /// Invoke request.
    #[must_use]
    pub fn invoke(invocation_id: Option<i32>, arguments: Vec<GlowValue>) -> Self {
        Self {
            number: CommandType::Invoke,
            dir_field_mask: None,
            invocation: Some(GlowInvocation {
                invocation_id,
                arguments,
            }),
        }
    }
}

const fn default_success() -> bool {
    true
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowInvocationResult {
    /// Id from the originating invocation.
    pub invocation_id: i32,
    /// Whether the function completed.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Result values in signature order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub result: Vec<GlowValue>,
}

impl GlowInvocationResult {
    /// Successful result.
    #[must_use]
    pub const fn succeeded(invocation_id: i32, result: Vec<GlowValue>) -> Self {
        Self {
            invocation_id,
            success: true,
            result,
        }
    }

    /// Failure marker.
    #[must_use]
    pub const fn failed(invocation_id: i32) -> Self {
        Self {
            invocation_id,
            success: false,
            result: Vec::new(),
        }
    }
}
