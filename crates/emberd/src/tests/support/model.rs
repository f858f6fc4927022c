//! Fixture control model and a dispatcher harness around it.

use std::sync::Arc;

use ember_glow::{GlowRoot, GlowValue, ParameterType, Path};
use rstest::fixture;

use crate::dispatch::Dispatcher;
use crate::dynamic::DynamicPathHandler;
use crate::model::{
    Element, ElementKind, Function, InvocationError, Matrix, MatrixKind, ModelError, Parameter,
    TupleItem,
};
use crate::session::Session;

use super::RecordingSink;

pub(crate) const DEVICE: u32 = 1;
pub(crate) const GAIN: u32 = 1;
pub(crate) const NAME: u32 = 2;
pub(crate) const MUTE: u32 = 3;
pub(crate) const SERIAL: u32 = 4;
pub(crate) const ROUTER: u32 = 2;
pub(crate) const LABELS: u32 = 3;
pub(crate) const ADD: u32 = 4;
pub(crate) const EXPLODE: u32 = 5;
pub(crate) const EXTERNAL: u32 = 6;
pub(crate) const MESH: u32 = 7;

fn sum_integers(arguments: &[GlowValue]) -> Result<Vec<GlowValue>, InvocationError> {
    match arguments {
        [GlowValue::Integer(left), GlowValue::Integer(right)] => {
            Ok(vec![GlowValue::Integer(left + right)])
        }
        _ => Err(InvocationError::failed("expected two integers")),
    }
}

fn explode(_arguments: &[GlowValue]) -> Result<Vec<GlowValue>, InvocationError> {
    Err(InvocationError::failed("overheated"))
}

/// Builds the fixture tree:
///
/// ```text
/// 1 device   { 1 gain: int -128..15 rw, 2 name: string rw, 3 mute: bool rw, 4 serial: string ro }
/// 2 router   one-to-N 4x4, labels at 3
/// 3 labels   leaf node
/// 4 add      (int, int) -> int
/// 5 explode  always fails
/// 6 external node, optionally with a dynamic handler
/// 7 mesh     N-to-N, declares 8x8, materializes targets {0, 2} and sources {1, 3}
/// ```
pub(crate) fn fixture_tree(handler: Option<Arc<dyn DynamicPathHandler>>) -> Element {
    build_tree(handler).expect("fixture tree should be valid")
}

fn build_tree(handler: Option<Arc<dyn DynamicPathHandler>>) -> Result<Element, ModelError> {
    let device = Element::node(DEVICE, "device")?
        .with_child(Element::new(
            GAIN,
            "gain",
            Parameter::integer(0, -128, 15)?.writable(),
        )?)?
        .with_child(Element::new(NAME, "name", Parameter::string("desk").writable())?)?
        .with_child(Element::new(MUTE, "mute", Parameter::boolean(false).writable())?)?
        .with_child(Element::new(SERIAL, "serial", Parameter::string("SN-1"))?)?;
    let router = Matrix::linear(MatrixKind::OneToN, 4, 4).with_labels(Path::from([LABELS]));
    let mesh = Matrix::sparse(MatrixKind::NToN { parameters: None }, 8, 8, [0, 2], [1, 3])?;
    let adder = Function::new(
        vec![
            TupleItem::new("left", ParameterType::Integer),
            TupleItem::new("right", ParameterType::Integer),
        ],
        vec![TupleItem::new("sum", ParameterType::Integer)],
        sum_integers,
    );
    let mut external = Element::node(EXTERNAL, "external")?;
    if let Some(handler) = handler {
        external = external.with_dynamic_handler(handler)?;
    }

    Element::root()
        .with_child(device)?
        .with_child(Element::new(ROUTER, "router", router)?)?
        .with_child(Element::node(LABELS, "labels")?)?
        .with_child(Element::new(ADD, "add", adder)?)?
        .with_child(Element::new(
            EXPLODE,
            "explode",
            Function::new(Vec::new(), Vec::new(), explode),
        )?)?
        .with_child(external)?
        .with_child(Element::new(MESH, "mesh", mesh)?)
}

/// Dispatcher over the fixture tree plus helpers to drive it.
pub(crate) struct Harness {
    pub(crate) dispatcher: Dispatcher,
}

impl Harness {
    pub(crate) fn with_handler(handler: Option<Arc<dyn DynamicPathHandler>>) -> Self {
        Self {
            dispatcher: Dispatcher::new(fixture_tree(handler)),
        }
    }

    /// Opens a session backed by a recording sink.
    pub(crate) fn client(&self) -> (Arc<Session>, RecordingSink) {
        let sink = RecordingSink::new();
        let session = self
            .dispatcher
            .sessions()
            .open(Box::new(sink.clone()), None);
        (session, sink)
    }

    pub(crate) fn send(&self, session: &Arc<Session>, root: &GlowRoot) {
        self.dispatcher
            .dispatch(root, session)
            .expect("dispatch should succeed");
    }

    /// Connected sources of `target` in the matrix numbered `matrix`.
    pub(crate) fn sources_of(&self, matrix: u32, target: u32) -> Vec<u32> {
        self.dispatcher
            .with_model(|root| match root.child(matrix).map(Element::kind) {
                Some(ElementKind::Matrix(matrix)) => matrix
                    .target(target)
                    .map(|signal| signal.connected_sources().iter().copied().collect())
                    .unwrap_or_default(),
                _ => Vec::new(),
            })
            .expect("model lock")
    }

    /// Current value of the device parameter numbered `parameter`.
    pub(crate) fn device_value(&self, parameter: u32) -> GlowValue {
        self.dispatcher
            .with_model(|root| {
                match root
                    .child(DEVICE)
                    .and_then(|device| device.child(parameter))
                    .map(Element::kind)
                {
                    Some(ElementKind::Parameter(found)) => found.value(),
                    _ => panic!("no device parameter numbered {parameter}"),
                }
            })
            .expect("model lock")
    }
}

#[fixture]
pub(crate) fn harness() -> Harness {
    Harness::with_handler(None)
}
