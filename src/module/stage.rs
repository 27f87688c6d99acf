//! Initialization stage bookkeeping.

/// Lifecycle state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InitStage {
    /// Constructed, no external bindings.
    Uninitialized,
    /// Services resolved and subscriptions made.
    Stage0Done,
    /// Deliveries may arrive; terminal.
    Stage1Done,
}

impl InitStage {
    /// State after `completed` stages have finished.
    pub fn after(completed: u32) -> Self {
        match completed {
            0 => InitStage::Uninitialized,
            1 => InitStage::Stage0Done,
            _ => InitStage::Stage1Done,
        }
    }

    /// Whether the module has finished the protocol.
    pub fn is_ready(self) -> bool {
        self == InitStage::Stage1Done
    }
}

impl std::fmt::Display for InitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitStage::Uninitialized => write!(f, "uninitialized"),
            InitStage::Stage0Done => write!(f, "stage 0 done"),
            InitStage::Stage1Done => write!(f, "stage 1 done"),
        }
    }
}
