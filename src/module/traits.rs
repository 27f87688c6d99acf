//! The `Module` trait implemented by every simulation participant.

use std::any::Any;

use crate::error::ModuleResult;
use crate::notify::NotificationReceiver;

use super::context::InitContext;
use super::base::ModuleCore;

/// Minimum number of init stages: subscriptions (stage 0) must strictly
/// precede the first delivery (stage 1).
pub const MIN_INIT_STAGES: u32 = 2;

/// Trait implemented by every module the runtime drives.
///
/// The runtime performs the base work of each stage (ordering checks and,
/// in stage 0, service resolution on the [`ModuleCore`]) before calling
/// [`initialize`](Self::initialize).
///
/// # Contract
///
/// - Subscribe in stage 0 only; the board rejects later subscriptions.
/// - Do the first stateful reads and initial publications in stage 1.
/// - Never report fewer than [`MIN_INIT_STAGES`] stages.
///
/// # Example
///
/// ```rust
/// use std::any::Any;
/// use netsim_base::error::ModuleResult;
/// use netsim_base::module::{InitContext, Module, ModuleCore};
/// use netsim_base::notify::NotificationReceiver;
///
/// struct Idle { core: ModuleCore }
///
/// impl NotificationReceiver for Idle {}
///
/// impl Module for Idle {
///     fn core(&self) -> &ModuleCore { &self.core }
///     fn core_mut(&mut self) -> &mut ModuleCore { &mut self.core }
///     fn initialize(&mut self, _ctx: &mut InitContext<'_>, _stage: u32) -> ModuleResult<()> {
///         Ok(())
///     }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
/// ```
pub trait Module: NotificationReceiver {
    fn core(&self) -> &ModuleCore;
    fn core_mut(&mut self) -> &mut ModuleCore;

    /// Number of init stages this module takes part in.
    fn num_init_stages(&self) -> u32 {
        MIN_INIT_STAGES
    }

    /// Stage hook, called once per stage in increasing order.
    fn initialize(&mut self, ctx: &mut InitContext<'_>, stage: u32) -> ModuleResult<()>;

    /// Downcast support, used by `Runtime::module::<T>()`.
    fn as_any(&self) -> &dyn Any;
    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
