//! Typed parameters and their write rules.

use ember_glow::{GlowValue, ParameterType};

use super::ModelError;

/// Integer parameter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerParameter {
    value: i64,
    minimum: i64,
    maximum: i64,
}

impl IntegerParameter {
    /// Current value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn minimum(&self) -> i64 {
        self.minimum
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn maximum(&self) -> i64 {
        self.maximum
    }
}

/// Variant payload of a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Boolean flag.
    Boolean(bool),
    /// Bounded integer.
    Integer(IntegerParameter),
    /// UTF-8 string.
    String(String),
}

/// Result of applying a write to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value changed.
    Changed,
    /// The value was accepted but equals the current one.
    Unchanged,
    /// The written value has a different type.
    TypeMismatch,
    /// The written integer lies outside the bounds.
    OutOfRange,
    /// The parameter does not accept remote writes.
    ReadOnly,
}

impl WriteOutcome {
    /// Whether the parameter now holds a different value.
    #[must_use]
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    kind: ParameterKind,
    writable: bool,
}

impl Parameter {
    /// Read-only boolean parameter.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self {
            kind: ParameterKind::Boolean(value),
            writable: false,
        }
    }

    /// Read-only string parameter.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: ParameterKind::String(value.into()),
            writable: false,
        }
    }

    /// Read-only integer parameter bounded by `[minimum, maximum]`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidBounds`] when the bounds are inverted or
    /// exclude `value`.
    pub fn integer(value: i64, minimum: i64, maximum: i64) -> Result<Self, ModelError> {
        if minimum > maximum || !(minimum..=maximum).contains(&value) {
            return Err(ModelError::InvalidBounds {
                value,
                minimum,
                maximum,
            });
        }
        Ok(Self {
            kind: ParameterKind::Integer(IntegerParameter {
                value,
                minimum,
                maximum,
            }),
            writable: false,
        })
    }

    /// Marks the parameter as accepting remote writes.
    #[must_use]
    pub const fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    /// Variant payload.
    #[must_use]
    pub const fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    /// Whether remote writes are accepted.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.writable
    }

    /// Type tag of the parameter.
    #[must_use]
    pub const fn value_type(&self) -> ParameterType {
        match self.kind {
            ParameterKind::Boolean(_) => ParameterType::Boolean,
            ParameterKind::Integer(_) => ParameterType::Integer,
            ParameterKind::String(_) => ParameterType::String,
        }
    }

    /// Current value in wire form.
    #[must_use]
    pub fn value(&self) -> GlowValue {
        match &self.kind {
            ParameterKind::Boolean(value) => GlowValue::Boolean(*value),
            ParameterKind::Integer(integer) => GlowValue::Integer(integer.value),
            ParameterKind::String(value) => GlowValue::String(value.clone()),
        }
    }

    /// Applies a write received from a controller.
    ///
    /// Read-only parameters reject the write before the value is inspected.
    pub fn write_remote(&mut self, value: &GlowValue) -> WriteOutcome {
        if !self.writable {
            return WriteOutcome::ReadOnly;
        }
        self.set_value(value)
    }

    /// Applies a device-side write, ignoring the writable flag.
    pub fn set_value(&mut self, value: &GlowValue) -> WriteOutcome {
        match (&mut self.kind, value) {
            (ParameterKind::Boolean(current), GlowValue::Boolean(next)) => {
                replace_if_different(current, *next)
            }
            (ParameterKind::String(current), GlowValue::String(next)) => {
                if current == next {
                    WriteOutcome::Unchanged
                } else {
                    next.clone_into(current);
                    WriteOutcome::Changed
                }
            }
            (ParameterKind::Integer(integer), GlowValue::Integer(next)) => {
                if (integer.minimum..=integer.maximum).contains(next) {
                    replace_if_different(&mut integer.value, *next)
                } else {
                    WriteOutcome::OutOfRange
                }
            }
            _ => WriteOutcome::TypeMismatch,
        }
    }
}

fn replace_if_different<T: PartialEq + Copy>(current: &mut T, next: T) -> WriteOutcome {
    if *current == next {
        WriteOutcome::Unchanged
    } else {
        *current = next;
        WriteOutcome::Changed
    }
}
