//! Control model served by the bundled daemon.
//!
//! A small four-channel router: identity strings, per-input gains, a 4x4
//! one-to-N routing matrix with its labels, and an `add` function for
//! exercising invocations.

use ember_glow::{GlowValue, ParameterType, Path};

use crate::model::{
    Element, Function, InvocationError, Matrix, MatrixKind, ModelError, Parameter, TupleItem,
};

const CHANNELS: u32 = 4;
const GAIN_MINIMUM: i64 = -128;
const GAIN_MAXIMUM: i64 = 15;

/// Number of the identity node below the root.
pub const IDENTITY: u32 = 1;
/// Number of the gains node below the root.
pub const GAINS: u32 = 2;
/// Number of the routing matrix below the root.
pub const ROUTER: u32 = 3;
/// Number of the labels node below the root.
pub const LABELS: u32 = 4;
/// Number of the `add` function below the root.
pub const ADD: u32 = 5;

/// Builds the sample device tree.
///
/// # Errors
///
/// Returns [`ModelError`] if the tree violates the model rules.
pub fn build() -> Result<Element, ModelError> {
    Element::root()
        .with_child(identity()?)?
        .with_child(gains()?)?
        .with_child(router()?)?
        .with_child(labels()?)?
        .with_child(add()?)
}

fn identity() -> Result<Element, ModelError> {
    Element::node(IDENTITY, "identity")?
        .with_description("Device identity")
        .with_child(Element::new(1, "product", Parameter::string("emberd router"))?)?
        .with_child(Element::new(2, "company", Parameter::string("emberd"))?)?
        .with_child(Element::new(
            3,
            "version",
            Parameter::string(env!("CARGO_PKG_VERSION")),
        )?)
}

fn gains() -> Result<Element, ModelError> {
    let mut node = Element::node(GAINS, "gains")?.with_description("Input gains in dB");
    for channel in 1..=CHANNELS {
        let gain = Parameter::integer(0, GAIN_MINIMUM, GAIN_MAXIMUM)?.writable();
        node.push_child(Element::new(channel, format!("input_{channel}"), gain)?)?;
    }
    Ok(node)
}

fn router() -> Result<Element, ModelError> {
    let matrix = Matrix::linear(MatrixKind::OneToN, CHANNELS, CHANNELS)
        .with_labels(Path::from([LABELS]));
    Ok(Element::new(ROUTER, "router", matrix)?.with_description("Output router"))
}

fn labels() -> Result<Element, ModelError> {
    Element::node(LABELS, "labels")?
        .with_child(label_strings(1, "targets", "Output")?)?
        .with_child(label_strings(2, "sources", "Input")?)
}

fn label_strings(number: u32, identifier: &str, prefix: &str) -> Result<Element, ModelError> {
    let mut node = Element::node(number, identifier)?;
    for signal in 0..CHANNELS {
        let label = Parameter::string(format!("{prefix} {}", signal + 1)).writable();
        node.push_child(Element::new(signal, format!("{identifier}_{signal}"), label)?)?;
    }
    Ok(node)
}

fn add() -> Result<Element, ModelError> {
    let function = Function::new(
        vec![
            TupleItem::new("augend", ParameterType::Integer),
            TupleItem::new("addend", ParameterType::Integer),
        ],
        vec![TupleItem::new("sum", ParameterType::Integer)],
        |arguments: &[GlowValue]| -> Result<Vec<GlowValue>, InvocationError> {
            let [GlowValue::Integer(augend), GlowValue::Integer(addend)] = arguments else {
                return Err(InvocationError::failed("expected two integers"));
            };
            augend
                .checked_add(*addend)
                .map(|sum| vec![GlowValue::Integer(sum)])
                .ok_or_else(|| InvocationError::failed("integer overflow"))
        },
    );
    Ok(Element::new(ADD, "add", function)?.with_description("Adds two integers"))
}
