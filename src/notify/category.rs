//! Notification category identifiers.

use serde::{Deserialize, Serialize};

/// A bulletin board category: a small integer shared by publishers and
/// subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category(u32);

impl Category {
    #[inline]
    pub fn new(id: u32) -> Self {
        Category(id)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.0)
    }
}
