//! Publish scripts: the external events replayed after initialization.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// One scripted publication, scoped to the host named `host`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptEntry {
    /// Host name the publication is scoped to.
    pub host: String,
    /// Category name on the board.
    pub category: String,
    /// Text payload, published as a [`BbValue::Text`](crate::notify::BbValue::Text).
    pub value: String,
}

/// Ordered list of publications, one per clock step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishScript {
    entries: Vec<ScriptEntry>,
}

impl PublishScript {
    pub fn new(entries: Vec<ScriptEntry>) -> Self {
        Self { entries }
    }

    /// Generates `steps` entries with a seeded RNG.
    ///
    /// Each step picks a host and a value uniformly. The same seed always
    /// yields the same script. Returns an empty script if `hosts` or
    /// `values` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use netsim_base::sim::script::PublishScript;
    ///
    /// let hosts = vec!["node0".to_string(), "node1".to_string()];
    /// let values = vec!["rx".to_string(), "tx".to_string()];
    /// let a = PublishScript::random(7, 5, &hosts, "radio-state", &values);
    /// let b = PublishScript::random(7, 5, &hosts, "radio-state", &values);
    /// assert_eq!(a, b);
    /// assert_eq!(a.len(), 5);
    /// ```
    pub fn random(
        seed: u64,
        steps: usize,
        hosts: &[String],
        category: &str,
        values: &[String],
    ) -> Self {
        if hosts.is_empty() || values.is_empty() {
            return Self::default();
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let entries = (0..steps)
            .map(|_| ScriptEntry {
                host: hosts[rng.random_range(0..hosts.len())].clone(),
                category: category.to_string(),
                value: values[rng.random_range(0..values.len())].clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    /// Entry played at `step`.
    pub fn get(&self, step: usize) -> Option<&ScriptEntry> {
        self.entries.get(step)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
