//! Module containment tree and the queries modules run against it.
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`id`] | [`ModuleId`] newtype |
//! | [`arena`] | [`Topology`] arena, [`HostCapability`], [`TopologyProvider`] |
//! | [`host`] | [`find_host`], [`host_index`] |
//! | [`identity`] | [`log_name`], [`get_log_name`] |

pub mod arena;
pub mod host;
pub mod id;
pub mod identity;

pub use arena::{HostCapability, HostProfile, ModuleRecord, Topology, TopologyProvider};
pub use host::{find_host, get_node, host_index};
pub use id::ModuleId;
pub use identity::{UNKNOWN_LOG_NAME, get_log_name, log_name};
