//! Module ids: indices of records in the topology arena.

/// Identifier of a module in the containment tree.
///
/// The raw value is the slot of the module's record in the
/// [`Topology`](super::Topology) arena, so it stays valid after other
/// modules are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Create a module ID from a raw integer.
    #[inline]
    pub fn new(id: u32) -> Self {
        ModuleId(id)
    }

    /// Return the underlying integer.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "M{}", self.0)
    }
}
