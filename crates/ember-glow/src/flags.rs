use bitflags::bitflags;

bitflags! {
    /// Field selection mask carried by directory requests.
    ///
    /// `ALL` sets every bit, so a projection made "under all" also carries
    /// type-specific metadata that no combination of the named fields
    /// unlocks. The generated `is_all` tests for exactly that mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: i32 {
        /// Element identifier.
        const IDENTIFIER = 1;
        /// Human readable description.
        const DESCRIPTION = 2;
        /// Child tree (reserved).
        const TREE = 4;
        /// Current parameter value.
        const VALUE = 8;
        /// Matrix cross-point connections.
        const CONNECTIONS = 16;
        /// Every field plus type-specific metadata.
        const ALL = -1;
    }
}

impl FieldFlags {
    /// Interprets a raw wire mask. Absent and zero ("default") both mean all.
    #[must_use]
    pub fn from_wire(mask: Option<i32>) -> Self {
        match mask {
            None | Some(0) => Self::ALL,
            Some(bits) => Self::from_bits_retain(bits),
        }
    }
}
