use serde::{Deserialize, Serialize};

/// Type tag shared by parameter values and function tuple descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// Signed 64-bit integer.
    Integer,
    /// UTF-8 string.
    String,
    /// Boolean flag.
    Boolean,
}

/// Typed value carried by parameters, invocations and invocation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlowValue {
    /// Integer value.
    Integer(i64),
    /// String value.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl GlowValue {
    /// The type tag of this value.
    #[must_use]
    pub const fn value_type(&self) -> ParameterType {
        match self {
            Self::Integer(_) => ParameterType::Integer,
            Self::String(_) => ParameterType::String,
            Self::Boolean(_) => ParameterType::Boolean,
        }
    }
}

impl From<i64> for GlowValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for GlowValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for GlowValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for GlowValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Access rights advertised for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlowAccess {
    /// No access.
    None,
    /// Read only (the implied default).
    Read,
    /// Write only.
    Write,
    /// Read and write.
    ReadWrite,
}
