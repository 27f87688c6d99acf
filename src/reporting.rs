use std::fmt;

use crate::runner::RunReport;
use crate::sim::trace::{TraceEntry, TraceKind};

/// Counts of trace records per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSummary {
    pub subscriptions: usize,
    pub stages_completed: usize,
    pub publications: usize,
    pub deliveries: usize,
}

impl TraceSummary {
    pub fn from_trace(trace: &[TraceEntry]) -> Self {
        let mut summary = Self::default();
        for entry in trace {
            match entry.kind {
                TraceKind::Subscribed { .. } => summary.subscriptions += 1,
                TraceKind::StageCompleted { .. } => summary.stages_completed += 1,
                TraceKind::Published { .. } => summary.publications += 1,
                TraceKind::Delivered { .. } => summary.deliveries += 1,
                TraceKind::DeliveryOpened => {}
            }
        }
        summary
    }
}

impl fmt::Display for TraceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Trace ---")?;
        writeln!(f, "Subscriptions:     {}", self.subscriptions)?;
        writeln!(f, "Stages completed:  {}", self.stages_completed)?;
        writeln!(f, "Publications:      {}", self.publications)?;
        write!(f, "Deliveries:        {}", self.deliveries)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Report ---")?;
        writeln!(f, "Seed: {}  Script steps: {}", self.seed, self.script_steps)?;
        writeln!(
            f,
            "Publications: {}  Deliveries: {}",
            self.publications, self.deliveries
        )?;
        for m in &self.modules {
            writeln!(f, "  {} {}@{} [{}] {}", m.id, m.name, m.log_name, m.kind, m.detail)?;
        }
        writeln!(f, "--- Battery Ledger ---")?;
        if self.ledger.is_empty() {
            return write!(f, "  (no accounts)");
        }
        for (i, r) in self.ledger.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "  {}/{} acct {}: I={:.5} A (peak {:.5} A, {} updates) E={:.4} J ({} updates)",
                r.host,
                r.owner,
                r.account,
                r.current_a,
                r.peak_current_a,
                r.current_updates,
                r.energy_j,
                r.energy_updates
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ModuleId;

    #[test]
    fn summary_counts_each_kind() {
        let trace = vec![
            TraceEntry {
                seq: 0,
                module: Some(ModuleId::new(1)),
                kind: TraceKind::Subscribed {
                    category: crate::notify::Category::new(0),
                },
            },
            TraceEntry {
                seq: 1,
                module: None,
                kind: TraceKind::DeliveryOpened,
            },
            TraceEntry {
                seq: 2,
                module: Some(ModuleId::new(1)),
                kind: TraceKind::Delivered {
                    category: crate::notify::Category::new(0),
                    scope: None,
                },
            },
        ];
        let summary = TraceSummary::from_trace(&trace);
        assert_eq!(summary.subscriptions, 1);
        assert_eq!(summary.deliveries, 1);
        assert_eq!(summary.publications, 0);
    }

    #[test]
    fn empty_ledger_is_reported() {
        let report = RunReport {
            seed: 1,
            script_steps: 0,
            publications: 0,
            deliveries: 0,
            trace_len: 0,
            modules: Vec::new(),
            ledger: Vec::new(),
        };
        assert!(report.to_string().contains("(no accounts)"));
    }
}
