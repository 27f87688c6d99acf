//! Host resolution: find the physical node enclosing a module.

use crate::error::{ModuleError, ModuleResult};

use super::arena::TopologyProvider;
use super::id::ModuleId;

/// Returns the nearest module at or above `id` exposing the host capability.
///
/// `None` means the module is not (yet) placed under a host: no ancestor is
/// a host, `id` is unknown, or the chain runs into a removed record. The walk
/// takes at most `capacity()` steps, so a parent cycle ends in `None`.
pub fn find_host<T>(topology: &T, id: ModuleId) -> Option<ModuleId>
where
    T: TopologyProvider + ?Sized,
{
    let mut current = id;
    for _ in 0..=topology.capacity() {
        if !topology.is_live(current) {
            return None;
        }
        if topology.host_capability(current).is_some() {
            return Some(current);
        }
        current = topology.parent(current)?;
    }
    None
}

/// Alias of [`find_host`] for code that thinks in terms of nodes.
pub fn get_node<T>(topology: &T, id: ModuleId) -> Option<ModuleId>
where
    T: TopologyProvider + ?Sized,
{
    find_host(topology, id)
}

/// Index of the host enclosing `id`.
///
/// # Errors
///
/// Returns [`ModuleError::Unattached`] when no host encloses `id`.
pub fn host_index<T>(topology: &T, id: ModuleId) -> ModuleResult<usize>
where
    T: TopologyProvider + ?Sized,
{
    find_host(topology, id)
        .and_then(|host| topology.host_capability(host))
        .map(|cap| cap.host_index())
        .ok_or(ModuleError::Unattached(id))
}
