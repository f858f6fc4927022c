//! Behavioural suites for the provider core.

pub(crate) mod support;
mod unit;
