//! The callback side of the notification contract.

use tracing::trace_span;

use crate::module::NotifyContext;
use crate::topology::ModuleId;

use super::category::Category;
use super::item::BbItem;

/// Implemented by every module that can be notified by the board.
///
/// The runtime calls [`receive_bb_item`](Self::receive_bb_item) only for
/// categories the module subscribed to during stage 0, and only after every
/// module has completed stage 0. A call never overlaps another call on the
/// same module: publications made from inside the handler are queued on
/// `ctx` and delivered after the current fan-out.
pub trait NotificationReceiver {
    /// Called when a subscribed category changes.
    ///
    /// `scope` names the module the notification concerns, if any; it is
    /// not filtered here. The default only marks the module context for
    /// diagnostics.
    fn receive_bb_item(
        &mut self,
        ctx: &mut NotifyContext<'_>,
        category: Category,
        details: &dyn BbItem,
        scope: Option<ModuleId>,
    ) {
        let _ = (details, scope);
        let _marker = trace_span!(
            "receive_bb_item",
            module = %ctx.log_name(),
            %category
        )
        .entered();
    }
}
