//! Wire representation shared by the Ember+ provider and its tests.
//!
//! The crate defines the element tree exchanged with controllers
//! ([`GlowRoot`] and friends), element [`Path`]s, the directory
//! [`FieldFlags`] mask, and the [`Codec`] boundary that turns frames into trees
//! and back.

mod codec;
mod element;
mod flags;
mod path;
mod value;

pub use codec::{Codec, DecodeError, EncodeError, JsonLinesCodec};
pub use element::{
    Address, AddressingMode, CommandType, ConnectionDisposition, ConnectionOperation, GlowCommand,
    GlowConnection, GlowElement, GlowFunction, GlowInvocation, GlowInvocationResult, GlowLabel,
    GlowMatrix, GlowNode, GlowParameter, GlowRoot, MatrixType, ParametersLocation,
    TupleItemDescription,
};
pub use flags::FieldFlags;
pub use path::Path;
pub use value::{GlowAccess, GlowValue, ParameterType};
