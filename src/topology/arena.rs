//! Arena of module records linked by parent indices.

use super::id::ModuleId;

/// Capability exposed by modules that represent a physical node.
pub trait HostCapability {
    /// Numeric index of the host, matching the index shown by debugging tools.
    fn host_index(&self) -> usize;

    /// Configured logging-name override, if any.
    fn logging_name(&self) -> Option<&str>;
}

/// Host attributes attached to a compound module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProfile {
    pub index: usize,
    pub logging_name: Option<String>,
}

impl HostProfile {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            logging_name: None,
        }
    }

    pub fn with_logging_name(index: usize, logging_name: impl Into<String>) -> Self {
        Self {
            index,
            logging_name: Some(logging_name.into()),
        }
    }
}

impl HostCapability for HostProfile {
    fn host_index(&self) -> usize {
        self.index
    }

    fn logging_name(&self) -> Option<&str> {
        self.logging_name.as_deref()
    }
}

/// Read access to the containment tree.
///
/// Host resolution and log naming only depend on this trait, so any
/// topology provider can back them.
pub trait TopologyProvider {
    /// Parent of `id`, or `None` for a root or an unknown id.
    fn parent(&self, id: ModuleId) -> Option<ModuleId>;

    /// Host capability of `id`, if the module exposes one.
    fn host_capability(&self, id: ModuleId) -> Option<&dyn HostCapability>;

    /// Structural (declared) name of `id`.
    fn structural_name(&self, id: ModuleId) -> Option<&str>;

    /// Upper bound on the length of any ancestor chain.
    fn capacity(&self) -> usize;

    /// Whether `id` names a live module.
    fn is_live(&self, id: ModuleId) -> bool {
        self.structural_name(id).is_some()
    }
}

/// A single node of the containment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub name: String,
    pub parent: Option<ModuleId>,
    pub host: Option<HostProfile>,
}

/// Arena owning every module record of a simulation.
///
/// Removed records leave an empty slot behind; ids are never reused, so a
/// stale id resolves to nothing instead of to an unrelated module.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    slots: Vec<Option<ModuleRecord>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record and returns its id.
    pub fn insert(&mut self, record: ModuleRecord) -> ModuleId {
        let id = ModuleId::new(self.slots.len() as u32);
        self.slots.push(Some(record));
        id
    }

    /// Adds a host compound module, optionally nested under `parent`.
    pub fn add_host(
        &mut self,
        name: impl Into<String>,
        profile: HostProfile,
        parent: Option<ModuleId>,
    ) -> ModuleId {
        self.insert(ModuleRecord {
            name: name.into(),
            parent,
            host: Some(profile),
        })
    }

    /// Adds a plain module under `parent` (or as a root when `None`).
    pub fn add_module(&mut self, name: impl Into<String>, parent: Option<ModuleId>) -> ModuleId {
        self.insert(ModuleRecord {
            name: name.into(),
            parent,
            host: None,
        })
    }

    /// Removes a record. Children keep their parent index, which now
    /// resolves to nothing.
    pub fn remove(&mut self, id: ModuleId) -> Option<ModuleRecord> {
        self.slots.get_mut(id.slot()).and_then(Option::take)
    }

    /// Reparents a live module.
    ///
    /// Returns `false` when `id` is not live.
    pub fn set_parent(&mut self, id: ModuleId, parent: Option<ModuleId>) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record.parent = parent;
                true
            }
            None => false,
        }
    }

    pub fn record(&self, id: ModuleId) -> Option<&ModuleRecord> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    pub fn record_mut(&mut self, id: ModuleId) -> Option<&mut ModuleRecord> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Live children of `id` in insertion order.
    pub fn children(&self, id: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.iter()
            .filter(move |(_, r)| r.parent == Some(id))
            .map(|(child, _)| child)
    }

    /// All live records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &ModuleRecord)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, r)| r.as_ref().map(|r| (ModuleId::new(slot as u32), r)))
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TopologyProvider for Topology {
    fn parent(&self, id: ModuleId) -> Option<ModuleId> {
        self.record(id).and_then(|r| r.parent)
    }

    fn host_capability(&self, id: ModuleId) -> Option<&dyn HostCapability> {
        self.record(id)
            .and_then(|r| r.host.as_ref())
            .map(|h| h as &dyn HostCapability)
    }

    fn structural_name(&self, id: ModuleId) -> Option<&str> {
        self.record(id).map(|r| r.name.as_str())
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_slots() {
        let mut topo = Topology::new();
        let a = topo.add_module("a", None);
        let b = topo.add_module("b", Some(a));
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(topo.parent(b), Some(a));
    }

    #[test]
    fn removed_slot_is_not_reused() {
        let mut topo = Topology::new();
        let a = topo.add_module("a", None);
        assert!(topo.remove(a).is_some());
        let b = topo.add_module("b", None);
        assert_ne!(a, b);
        assert!(!topo.is_live(a));
        assert_eq!(topo.len(), 1);
    }

    #[test]
    fn children_skip_removed_records() {
        let mut topo = Topology::new();
        let host = topo.add_host("node", HostProfile::new(0), None);
        let nic = topo.add_module("nic", Some(host));
        let app = topo.add_module("app", Some(host));
        topo.remove(nic);
        let kids: Vec<_> = topo.children(host).collect();
        assert_eq!(kids, vec![app]);
    }

    #[test]
    fn host_capability_only_on_hosts() {
        let mut topo = Topology::new();
        let host = topo.add_host("node", HostProfile::with_logging_name(4, "alpha"), None);
        let app = topo.add_module("app", Some(host));
        let cap = topo.host_capability(host).map(|c| (c.host_index(), c.logging_name()));
        assert_eq!(cap, Some((4, Some("alpha"))));
        assert!(topo.host_capability(app).is_none());
    }

    #[test]
    fn set_parent_on_dead_module_fails() {
        let mut topo = Topology::new();
        let a = topo.add_module("a", None);
        topo.remove(a);
        assert!(!topo.set_parent(a, None));
    }
}
