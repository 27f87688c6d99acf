//! Human-readable module names for diagnostics.

use super::arena::TopologyProvider;
use super::host::find_host;
use super::id::ModuleId;

/// Name returned for ids that do not resolve to a live module.
pub const UNKNOWN_LOG_NAME: &str = "<unknown>";

/// Logging name of `id`: the host's override, else the host's structural name.
///
/// A module that is not under any host reports its own structural name.
/// Unknown ids yield [`UNKNOWN_LOG_NAME`].
pub fn log_name<T>(topology: &T, id: ModuleId) -> String
where
    T: TopologyProvider + ?Sized,
{
    resolve(topology, id).unwrap_or_else(|| UNKNOWN_LOG_NAME.to_string())
}

/// Logging name of an arbitrary module, used to cross-reference peers.
///
/// Never fails; see [`log_name`] for the resolution rules.
pub fn get_log_name<T>(topology: &T, id: ModuleId) -> String
where
    T: TopologyProvider + ?Sized,
{
    log_name(topology, id)
}

fn resolve<T>(topology: &T, id: ModuleId) -> Option<String>
where
    T: TopologyProvider + ?Sized,
{
    let Some(host) = find_host(topology, id) else {
        return topology.structural_name(id).map(str::to_string);
    };
    let cap = topology.host_capability(host)?;
    cap.logging_name()
        .or_else(|| topology.structural_name(host))
        .map(str::to_string)
}
