//! Projection of model elements into wire elements under a field mask.
//!
//! Every projection is emitted in qualified form, carrying the full path of
//! the element. Metadata that only makes sense to a controller building its
//! first view of the tree (bounds, access, schema, matrix topology, function
//! signatures) is emitted only when the mask is exactly [`FieldFlags::ALL`].

use ember_glow::{
    AddressingMode, ConnectionDisposition, FieldFlags, GlowAccess, GlowConnection, GlowElement,
    GlowFunction, GlowLabel, GlowMatrix, GlowNode, GlowParameter, GlowRoot, GlowValue, MatrixType,
    ParametersLocation, Path,
};

use crate::model::{
    Element, ElementKind, Function, Matrix, MatrixKind, Parameter, ParameterKind, Signal,
};

const PRIMARY_LABELS: &str = "Primary";
const DYNAMIC_GAIN_PARAMETER: u32 = 1;

/// Controls what a projection includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Field selection.
    pub fields: FieldFlags,
    /// Set when a matrix is projected in answer to a directory request on the
    /// matrix itself. Only then is its connection state included.
    pub complete_matrix_enquiry: bool,
}

impl ProjectionOptions {
    /// Options selecting `fields` without complete matrix enquiry.
    #[must_use]
    pub const fn new(fields: FieldFlags) -> Self {
        Self {
            fields,
            complete_matrix_enquiry: false,
        }
    }

    /// Options selecting every field.
    #[must_use]
    pub const fn all() -> Self {
        Self::new(FieldFlags::ALL)
    }

    /// Marks the projection as a complete matrix enquiry.
    #[must_use]
    pub const fn complete(mut self) -> Self {
        self.complete_matrix_enquiry = true;
        self
    }

    fn is_all(self) -> bool {
        self.fields.is_all()
    }
}

/// Projects `element`, located at `path`, into its wire form.
#[must_use]
pub fn project(element: &Element, path: &Path, options: ProjectionOptions) -> GlowElement {
    match element.kind() {
        ElementKind::Node(_) => project_node(element, path, options).into(),
        ElementKind::Parameter(parameter) => {
            project_parameter(element, parameter, path, options).into()
        }
        ElementKind::Matrix(matrix) => project_matrix(element, matrix, path, options).into(),
        ElementKind::Function(function) => {
            project_function(element, function, path, options).into()
        }
    }
}

/// Answers a directory request addressed to `element`.
///
/// A node with no children yields a bare stub of itself and a node with
/// children yields one projection per direct child. Any other element yields
/// its own projection, matrices as a complete enquiry.
#[must_use]
pub fn directory(element: &Element, path: &Path, fields: FieldFlags) -> Vec<GlowElement> {
    let options = ProjectionOptions::new(fields);
    match element.kind() {
        ElementKind::Node(node) if node.is_leaf() => {
            vec![GlowNode::qualified(path.clone()).into()]
        }
        ElementKind::Node(node) => node
            .children()
            .iter()
            .map(|child| project(child, &path.child(child.number()), options))
            .collect(),
        ElementKind::Matrix(_) => vec![project(element, path, options.complete())],
        ElementKind::Parameter(_) | ElementKind::Function(_) => {
            vec![project(element, path, options)]
        }
    }
}

/// Builds the connection diff reported after a connect request.
///
/// Each listed target that exists appears once with its full resulting source
/// list and a `Modified` disposition.
#[must_use]
pub fn connection_diff(matrix: &Matrix, path: &Path, targets: &[u32]) -> GlowRoot {
    let glow = targets
        .iter()
        .filter_map(|&number| matrix.target(number))
        .fold(GlowMatrix::qualified(path.clone()), |glow, signal| {
            let mut connection =
                GlowConnection::new(signal.number()).with_sources(source_numbers(signal));
            connection.disposition = Some(ConnectionDisposition::Modified);
            glow.with_connection(connection)
        });
    GlowRoot::single(glow)
}

/// Builds the value-only update pushed when a parameter changes.
#[must_use]
pub fn value_update(path: &Path, value: GlowValue) -> GlowRoot {
    GlowRoot::single(GlowParameter::qualified(path.clone()).with_value(value))
}

fn source_numbers(signal: &Signal) -> Vec<u32> {
    signal.connected_sources().iter().copied().collect()
}

fn signal_numbers(signals: &[Signal]) -> Vec<u32> {
    signals.iter().map(Signal::number).collect()
}

fn masked_identifier(element: &Element, options: ProjectionOptions) -> Option<String> {
    options
        .fields
        .contains(FieldFlags::IDENTIFIER)
        .then(|| element.identifier().to_owned())
}

fn masked_description(element: &Element, options: ProjectionOptions) -> Option<String> {
    if options.fields.contains(FieldFlags::DESCRIPTION) {
        element.description().map(str::to_owned)
    } else {
        None
    }
}

fn masked_schema(element: &Element, options: ProjectionOptions) -> Option<String> {
    if options.is_all() {
        element.schema_identifier().map(str::to_owned)
    } else {
        None
    }
}

fn project_node(element: &Element, path: &Path, options: ProjectionOptions) -> GlowNode {
    GlowNode {
        identifier: masked_identifier(element, options),
        description: masked_description(element, options),
        schema_identifiers: masked_schema(element, options),
        ..GlowNode::qualified(path.clone())
    }
}

fn project_parameter(
    element: &Element,
    parameter: &Parameter,
    path: &Path,
    options: ProjectionOptions,
) -> GlowParameter {
    let mut glow = GlowParameter {
        identifier: masked_identifier(element, options),
        description: masked_description(element, options),
        schema_identifiers: masked_schema(element, options),
        ..GlowParameter::qualified(path.clone())
    };
    if options.fields.contains(FieldFlags::VALUE) {
        glow.value = Some(parameter.value());
    }
    if options.is_all() {
        if let ParameterKind::Integer(integer) = parameter.kind() {
            glow.minimum = Some(integer.minimum());
            glow.maximum = Some(integer.maximum());
        }
        if parameter.is_writable() {
            glow.access = Some(GlowAccess::ReadWrite);
        }
    }
    glow
}

fn project_matrix(
    element: &Element,
    matrix: &Matrix,
    path: &Path,
    options: ProjectionOptions,
) -> GlowMatrix {
    let mut glow = GlowMatrix {
        identifier: Some(element.identifier().to_owned()),
        description: masked_description(element, options),
        target_count: Some(matrix.target_count()),
        source_count: Some(matrix.source_count()),
        schema_identifiers: masked_schema(element, options),
        ..GlowMatrix::qualified(path.clone())
    };

    if options.is_all()
        && let Some(labels) = matrix.labels()
    {
        glow.labels.push(GlowLabel {
            base_path: labels.clone(),
            description: PRIMARY_LABELS.to_owned(),
        });
    }

    if options.fields.contains(FieldFlags::CONNECTIONS) && options.complete_matrix_enquiry {
        let connections = matrix
            .targets()
            .iter()
            .map(|signal| {
                let connection = GlowConnection::new(signal.number());
                if signal.connected_sources().is_empty() {
                    connection
                } else {
                    connection.with_sources(source_numbers(signal))
                }
            })
            .collect();
        glow.connections = Some(connections);
    }

    if !options.is_all() {
        return glow;
    }

    match matrix.kind() {
        MatrixKind::OneToN => {}
        MatrixKind::OneToOne => glow.matrix_type = Some(MatrixType::OneToOne),
        MatrixKind::NToN { parameters } => {
            glow.matrix_type = Some(MatrixType::NToN);
            glow.addressing_mode = Some(AddressingMode::NonLinear);
            glow.parameters_location = parameters.clone().map(ParametersLocation::BasePath);
        }
        MatrixKind::Dynamic {
            parameters_sub_identifier,
        } => {
            glow.matrix_type = Some(MatrixType::NToN);
            glow.parameters_location =
                Some(ParametersLocation::Inline(*parameters_sub_identifier));
            glow.gain_parameter_number = Some(DYNAMIC_GAIN_PARAMETER);
        }
    }

    if options.complete_matrix_enquiry {
        let lists_all = matches!(matrix.kind(), MatrixKind::NToN { .. });
        if lists_all || count_below(matrix.targets(), matrix.target_count()) {
            glow.targets = Some(signal_numbers(matrix.targets()));
        }
        if lists_all || count_below(matrix.sources(), matrix.source_count()) {
            glow.sources = Some(signal_numbers(matrix.sources()));
        }
    }
    glow
}

fn count_below(signals: &[Signal], declared: u32) -> bool {
    u32::try_from(signals.len()).is_ok_and(|materialized| materialized < declared)
}

fn project_function(
    element: &Element,
    function: &Function,
    path: &Path,
    options: ProjectionOptions,
) -> GlowFunction {
    let mut glow = GlowFunction {
        identifier: masked_identifier(element, options),
        description: masked_description(element, options),
        ..GlowFunction::qualified(path.clone())
    };
    if options.is_all() {
        glow.arguments = Some(function.arguments().iter().map(|item| item.describe()).collect());
        glow.result = Some(function.result().iter().map(|item| item.describe()).collect());
    }
    glow
}

#[cfg(test)]
mod tests {
    use ember_glow::{ParameterType, TupleItemDescription};
    use rstest::rstest;

    use super::*;
    use crate::model::{InvocationError, TupleItem};

    fn gain() -> Element {
        Element::new(
            0,
            "gain",
            Parameter::integer(-6, -128, 15).expect("bounds").writable(),
        )
        .expect("gain")
        .with_description("Input gain")
        .with_schema_identifier("de.l-s-b.emberplus.gain")
    }

    fn router(matrix: Matrix) -> Element {
        Element::new(2, "router", matrix)
            .expect("router")
            .with_description("Main router")
    }

    fn matrix_of(element: GlowElement) -> GlowMatrix {
        match element {
            GlowElement::Matrix(matrix) => matrix,
            other => panic!("expected matrix, got {other:?}"),
        }
    }

    fn parameter_of(element: GlowElement) -> GlowParameter {
        match element {
            GlowElement::Parameter(parameter) => parameter,
            other => panic!("expected parameter, got {other:?}"),
        }
    }

    #[test]
    fn parameter_under_all_carries_metadata() {
        let glow = parameter_of(project(&gain(), &Path::from([1, 0]), ProjectionOptions::all()));
        assert_eq!(glow.identifier.as_deref(), Some("gain"));
        assert_eq!(glow.description.as_deref(), Some("Input gain"));
        assert_eq!(glow.value, Some(GlowValue::Integer(-6)));
        assert_eq!((glow.minimum, glow.maximum), (Some(-128), Some(15)));
        assert_eq!(glow.access, Some(GlowAccess::ReadWrite));
        assert!(glow.schema_identifiers.is_some());
    }

    #[rstest]
    #[case(FieldFlags::VALUE)]
    #[case(FieldFlags::IDENTIFIER | FieldFlags::VALUE)]
    fn narrow_mask_hides_metadata(#[case] fields: FieldFlags) {
        let glow = parameter_of(project(
            &gain(),
            &Path::from([1, 0]),
            ProjectionOptions::new(fields),
        ));
        assert_eq!(glow.value, Some(GlowValue::Integer(-6)));
        assert_eq!(glow.description, None);
        assert_eq!((glow.minimum, glow.maximum), (None, None));
        assert_eq!(glow.access, None);
        assert_eq!(glow.schema_identifiers, None);
        assert_eq!(
            glow.identifier.is_some(),
            fields.contains(FieldFlags::IDENTIFIER)
        );
    }

    #[test]
    fn matrix_hides_connections_without_complete_enquiry() {
        let element = router(Matrix::linear(MatrixKind::OneToN, 4, 4));
        let glow = matrix_of(project(&element, &Path::from([2]), ProjectionOptions::all()));
        assert_eq!(glow.identifier.as_deref(), Some("router"));
        assert_eq!((glow.target_count, glow.source_count), (Some(4), Some(4)));
        assert_eq!(glow.connections, None);
    }

    #[test]
    fn matrix_identifier_and_counts_survive_any_mask() {
        let element = router(Matrix::linear(MatrixKind::OneToN, 4, 4));
        let glow = matrix_of(project(
            &element,
            &Path::from([2]),
            ProjectionOptions::new(FieldFlags::VALUE),
        ));
        assert_eq!(glow.identifier.as_deref(), Some("router"));
        assert_eq!(glow.description, None);
        assert_eq!((glow.target_count, glow.source_count), (Some(4), Some(4)));
    }

    #[test]
    fn complete_enquiry_lists_every_target() {
        let mut matrix = Matrix::linear(MatrixKind::OneToN, 4, 4).with_labels(Path::from([3]));
        matrix.connect(0, &[2], ember_glow::ConnectionOperation::Absolute);
        let glow = matrix_of(project(
            &router(matrix),
            &Path::from([2]),
            ProjectionOptions::all().complete(),
        ));
        let connections = glow.connections.expect("connections");
        assert_eq!(connections.len(), 4);
        assert_eq!(connections[0].sources, Some(vec![2]));
        assert!(connections[1..].iter().all(|entry| entry.sources.is_none()));
        assert_eq!(glow.labels[0].base_path, Path::from([3]));
        assert_eq!(glow.labels[0].description, PRIMARY_LABELS);
        assert_eq!(glow.matrix_type, None);
        assert_eq!(glow.targets, None);
    }

    #[test]
    fn labels_require_exactly_all() {
        let matrix = Matrix::linear(MatrixKind::OneToN, 2, 2).with_labels(Path::from([3]));
        let glow = matrix_of(project(
            &router(matrix),
            &Path::from([2]),
            ProjectionOptions::new(FieldFlags::IDENTIFIER | FieldFlags::CONNECTIONS).complete(),
        ));
        assert!(glow.labels.is_empty());
        assert!(glow.connections.is_some());
    }

    #[test]
    fn sparse_matrix_emits_signal_stubs() {
        let matrix = Matrix::sparse(MatrixKind::OneToOne, 8, 2, [1, 5], [0, 1]).expect("sparse");
        let glow = matrix_of(project(
            &router(matrix),
            &Path::from([2]),
            ProjectionOptions::all().complete(),
        ));
        assert_eq!(glow.matrix_type, Some(MatrixType::OneToOne));
        assert_eq!(glow.targets, Some(vec![1, 5]));
        assert_eq!(glow.sources, None);
    }

    #[test]
    fn n_to_n_emits_topology_and_signal_lists() {
        let matrix = Matrix::linear(
            MatrixKind::NToN {
                parameters: Some(Path::from([9])),
            },
            2,
            3,
        );
        let glow = matrix_of(project(
            &router(matrix),
            &Path::from([2]),
            ProjectionOptions::all().complete(),
        ));
        assert_eq!(glow.matrix_type, Some(MatrixType::NToN));
        assert_eq!(glow.addressing_mode, Some(AddressingMode::NonLinear));
        assert_eq!(
            glow.parameters_location,
            Some(ParametersLocation::BasePath(Path::from([9])))
        );
        assert_eq!(glow.targets, Some(vec![0, 1]));
        assert_eq!(glow.sources, Some(vec![0, 1, 2]));
    }

    #[test]
    fn dynamic_matrix_emits_inline_parameters() {
        let matrix = Matrix::linear(
            MatrixKind::Dynamic {
                parameters_sub_identifier: 4,
            },
            2,
            2,
        );
        let glow = matrix_of(project(&router(matrix), &Path::from([2]), ProjectionOptions::all()));
        assert_eq!(glow.matrix_type, Some(MatrixType::NToN));
        assert_eq!(glow.parameters_location, Some(ParametersLocation::Inline(4)));
        assert_eq!(glow.gain_parameter_number, Some(1));
    }

    #[test]
    fn function_signature_requires_all() {
        let function = Function::new(
            vec![TupleItem::new("left", ParameterType::Integer)],
            vec![TupleItem::new("sum", ParameterType::Integer)],
            |_: &[GlowValue]| Err::<Vec<GlowValue>, _>(InvocationError::failed("unused")),
        );
        let element = Element::new(4, "add", function).expect("function");
        let GlowElement::Function(full) = project(&element, &Path::from([4]), ProjectionOptions::all())
        else {
            panic!("expected function");
        };
        assert_eq!(
            full.arguments,
            Some(vec![TupleItemDescription {
                name: "left".to_owned(),
                value_type: ParameterType::Integer,
            }])
        );
        let GlowElement::Function(narrow) = project(
            &element,
            &Path::from([4]),
            ProjectionOptions::new(FieldFlags::IDENTIFIER),
        ) else {
            panic!("expected function");
        };
        assert_eq!(narrow.arguments, None);
        assert_eq!(narrow.result, None);
    }

    #[test]
    fn leaf_node_directory_is_a_self_stub() {
        let node = Element::node(3, "labels").expect("labels");
        assert_eq!(
            directory(&node, &Path::from([3]), FieldFlags::ALL),
            vec![GlowElement::from(GlowNode::qualified(Path::from([3])))]
        );
    }

    #[test]
    fn node_directory_lists_children_one_level_deep() {
        let device = Element::node(1, "device")
            .expect("device")
            .with_child(gain())
            .expect("gain child")
            .with_child(
                Element::node(1, "nested")
                    .expect("nested")
                    .with_child(Element::node(0, "deeper").expect("deeper"))
                    .expect("deeper child"),
            )
            .expect("nested child");
        let listing = directory(&device, &Path::from([1]), FieldFlags::ALL);
        assert_eq!(listing.len(), 2);
        let GlowElement::Node(nested) = &listing[1] else {
            panic!("expected nested node");
        };
        assert_eq!(nested.address, ember_glow::Address::Path(Path::from([1, 1])));
        assert!(nested.children.is_empty());
    }

    #[test]
    fn connection_diff_reports_full_source_lists() {
        let mut matrix = Matrix::linear(MatrixKind::NToN { parameters: None }, 2, 2);
        matrix.connect(1, &[0, 1], ember_glow::ConnectionOperation::Absolute);
        let diff = connection_diff(&matrix, &Path::from([2]), &[1, 0]);
        let GlowElement::Matrix(glow) = &diff.elements[0] else {
            panic!("expected matrix");
        };
        let connections = glow.connections.as_ref().expect("connections");
        assert_eq!(connections[0].sources, Some(vec![0, 1]));
        assert_eq!(connections[1].sources, Some(vec![]));
        assert!(connections
            .iter()
            .all(|entry| entry.disposition == Some(ConnectionDisposition::Modified)));
    }
}
