//! Trace records for subscriptions, stage completions and deliveries.

use serde::Serialize;

use crate::notify::Category;
use crate::topology::ModuleId;

/// What happened at one point of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceKind {
    /// The module subscribed to a category.
    Subscribed { category: Category },
    /// The module finished an init stage.
    StageCompleted { stage: u32 },
    /// Every module finished stage 0; the board now delivers.
    DeliveryOpened,
    /// A publication started fanning out.
    Published {
        category: Category,
        scope: Option<ModuleId>,
        receivers: usize,
    },
    /// A notification was handed to the module.
    Delivered {
        category: Category,
        scope: Option<ModuleId>,
    },
}

/// A single trace record. `seq` is strictly increasing over a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub seq: u64,
    /// Module the entry concerns; `None` for runtime-wide or external events.
    pub module: Option<ModuleId>,
    pub kind: TraceKind,
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[#{}", self.seq)?;
        if let Some(m) = self.module {
            write!(f, " {m}")?;
        }
        write!(f, "] ")?;
        match &self.kind {
            TraceKind::Subscribed { category } => write!(f, "Subscribed({category})"),
            TraceKind::StageCompleted { stage } => write!(f, "StageCompleted({stage})"),
            TraceKind::DeliveryOpened => write!(f, "DeliveryOpened"),
            TraceKind::Published {
                category,
                scope,
                receivers,
            } => write!(f, "Published({category}, scope={scope:?}, receivers={receivers})"),
            TraceKind::Delivered { category, scope } => {
                write!(f, "Delivered({category}, scope={scope:?})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_module_and_kind() {
        let entry = TraceEntry {
            seq: 4,
            module: Some(ModuleId::new(2)),
            kind: TraceKind::Delivered {
                category: Category::new(7),
                scope: None,
            },
        };
        assert_eq!(entry.to_string(), "[#4 M2] Delivered(C7, scope=None)");
    }

    #[test]
    fn runtime_entries_have_no_module() {
        let entry = TraceEntry {
            seq: 0,
            module: None,
            kind: TraceKind::DeliveryOpened,
        };
        assert_eq!(entry.to_string(), "[#0] DeliveryOpened");
    }
}
