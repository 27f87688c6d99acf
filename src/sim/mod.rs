//! Simulation runtime, clock, publish scripts and the event trace.

/// Step clock used to replay publish scripts.
pub mod clock;
pub mod runtime;
pub mod script;
/// Ordered record of lifecycle and notification events.
pub mod trace;

pub use clock::Clock;
pub use runtime::{DEFAULT_CASCADE_LIMIT, Runtime};
pub use script::{PublishScript, ScriptEntry};
pub use trace::{TraceEntry, TraceKind};
