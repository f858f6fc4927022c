use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer-sequence address of an element counted from the tree root.
///
/// The root is the empty path. Each segment is the `number` of a child within
/// its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<u32>);

impl Path {
    /// The empty path addressing the root.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path of the child numbered `number` below this path.
    #[must_use]
    pub fn child(&self, number: u32) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(number);
        Self(segments)
    }

    /// Path segments from the root downwards.
    #[must_use]
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Whether this path addresses the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u32>> for Path {
    fn from(segments: Vec<u32>) -> Self {
        Self(segments)
    }
}

impl From<&[u32]> for Path {
    fn from(segments: &[u32]) -> Self {
        Self(segments.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for Path {
    fn from(segments: [u32; N]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                formatter.write_str(".")?;
            }
            write!(formatter, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}
