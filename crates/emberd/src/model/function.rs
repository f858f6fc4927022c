//! Invokable functions.

use std::fmt;
use std::sync::Arc;

use ember_glow::{GlowValue, ParameterType, TupleItemDescription};
use thiserror::Error;

/// Errors produced while running a function.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvocationError {
    /// The caller supplied the wrong number of arguments.
    #[error("expected {expected} arguments, received {received}")]
    ArgumentCount {
        /// Declared argument count.
        expected: usize,
        /// Supplied argument count.
        received: usize,
    },
    /// An argument does not match its declared type.
    #[error("argument '{name}' expects {expected:?}, received {received:?}")]
    ArgumentType {
        /// Declared argument name.
        name: String,
        /// Declared type.
        expected: ParameterType,
        /// Supplied type.
        received: ParameterType,
    },
    /// The function body reported a failure.
    #[error("invocation failed: {message}")]
    Failed {
        /// Failure description.
        message: String,
    },
    /// The function body panicked.
    #[error("invocation panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl InvocationError {
    /// Convenience constructor for [`InvocationError::Failed`].
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Body of a function.
pub trait FunctionAction: Send + Sync {
    /// Runs the function with arguments already checked against the signature.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when the function cannot complete.
    fn invoke(&self, arguments: &[GlowValue]) -> Result<Vec<GlowValue>, InvocationError>;
}

impl<F> FunctionAction for F
where
    F: Fn(&[GlowValue]) -> Result<Vec<GlowValue>, InvocationError> + Send + Sync,
{
    fn invoke(&self, arguments: &[GlowValue]) -> Result<Vec<GlowValue>, InvocationError> {
        self(arguments)
    }
}

/// Named, typed entry of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleItem {
    name: String,
    value_type: ParameterType,
}

impl TupleItem {
    /// Builds a signature entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    /// Entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry type.
    #[must_use]
    pub const fn value_type(&self) -> ParameterType {
        self.value_type
    }

    pub(crate) fn describe(&self) -> TupleItemDescription {
        TupleItemDescription {
            name: self.name.clone(),
            value_type: self.value_type,
        }
    }
}

/// Function signature plus body.
#[derive(Clone)]
pub struct Function {
    arguments: Vec<TupleItem>,
    result: Vec<TupleItem>,
    action: Arc<dyn FunctionAction>,
}

impl Function {
    /// Builds a function from its signature and body.
    pub fn new(
        arguments: Vec<TupleItem>,
        result: Vec<TupleItem>,
        action: impl FunctionAction + 'static,
    ) -> Self {
        Self {
            arguments,
            result,
            action: Arc::new(action),
        }
    }

    /// Argument descriptors in order.
    #[must_use]
    pub fn arguments(&self) -> &[TupleItem] {
        &self.arguments
    }

    /// Result descriptors in order.
    #[must_use]
    pub fn result(&self) -> &[TupleItem] {
        &self.result
    }

    /// Shared handle to the body, usable after the model lock is released.
    #[must_use]
    pub fn action(&self) -> Arc<dyn FunctionAction> {
        Arc::clone(&self.action)
    }

    /// Checks `arguments` against the declared signature.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::ArgumentCount`] or
    /// [`InvocationError::ArgumentType`] on the first mismatch.
    pub fn check_arguments(&self, arguments: &[GlowValue]) -> Result<(), InvocationError> {
        if arguments.len() != self.arguments.len() {
            return Err(InvocationError::ArgumentCount {
                expected: self.arguments.len(),
                received: arguments.len(),
            });
        }
        for (item, value) in self.arguments.iter().zip(arguments) {
            let received = value.value_type();
            if received != item.value_type {
                return Err(InvocationError::ArgumentType {
                    name: item.name.clone(),
                    expected: item.value_type,
                    received,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Function")
            .field("arguments", &self.arguments)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn add() -> Function {
        Function::new(
            vec![
                TupleItem::new("left", ParameterType::Integer),
                TupleItem::new("right", ParameterType::Integer),
            ],
            vec![TupleItem::new("sum", ParameterType::Integer)],
            |arguments: &[GlowValue]| match arguments {
                [GlowValue::Integer(left), GlowValue::Integer(right)] => {
                    Ok(vec![GlowValue::Integer(left + right)])
                }
                _ => Err(InvocationError::failed("unexpected arguments")),
            },
        )
    }

    #[test]
    fn closures_act_as_function_bodies() {
        let function = add();
        let arguments = [GlowValue::Integer(2), GlowValue::Integer(3)];
        assert!(function.check_arguments(&arguments).is_ok());
        assert_eq!(
            function.action().invoke(&arguments),
            Ok(vec![GlowValue::Integer(5)])
        );
    }

    #[rstest]
    #[case(vec![GlowValue::Integer(1)])]
    #[case(vec![GlowValue::Integer(1), GlowValue::Integer(2), GlowValue::Integer(3)])]
    fn rejects_wrong_argument_count(#[case] arguments: Vec<GlowValue>) {
        assert!(matches!(
            add().check_arguments(&arguments),
            Err(InvocationError::ArgumentCount { expected: 2, .. })
        ));
    }

    #[test]
    fn rejects_wrong_argument_type() {
        let error = add()
            .check_arguments(&[GlowValue::Integer(1), GlowValue::from("two")])
            .expect_err("string argument should fail");
        assert_eq!(
            error,
            InvocationError::ArgumentType {
                name: "right".to_owned(),
                expected: ParameterType::Integer,
                received: ParameterType::String,
            }
        );
    }
}
