//! Command dispatch for inbound controller messages.
//!
//! An inbound [`ember_glow::GlowRoot`] is flattened by the [`walk`]er into
//! addressed units. The [`Dispatcher`] resolves each unit against the control
//! model and acts on it:
//!
//! | Unit | Element | Effect |
//! |---|---|---|
//! | directory | node | children, or a self-stub for a leaf, to the requester |
//! | directory | parameter, function | own projection to the requester |
//! | directory | matrix | complete projection to the requester, who becomes a subscriber |
//! | unsubscribe | matrix | requester stops receiving connection changes |
//! | invoke | function | result to the requester only, from a worker thread |
//! | parameter write | parameter | typed write; a change is pushed to every session |
//! | matrix connect | matrix | connection diff to every subscriber |
//!
//! Units addressed to paths that do not resolve go to the dynamic handler of
//! the deepest resolved node, or are dropped when there is none.

mod dispatcher;
mod errors;
mod invocation;
mod walker;

pub use self::dispatcher::Dispatcher;
pub use self::errors::DispatchError;
pub use self::walker::{Unit, walk};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
