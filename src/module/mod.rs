//! Module lifecycle: the shared [`ModuleCore`], the [`Module`] trait, and
//! the contexts modules act through.
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`stage`] | [`InitStage`] state machine |
//! | [`locator`] | [`ServiceLocator`] |
//! | [`base`] | [`ModuleCore`] |
//! | [`context`] | [`InitContext`], [`NotifyContext`], [`Publication`] |
//! | [`traits`] | [`Module`] trait |

pub mod base;
pub mod context;
pub mod locator;
pub mod stage;
pub mod traits;

pub use base::ModuleCore;
pub use context::{InitContext, NotifyContext, Publication};
pub(crate) use context::Effects;
pub use locator::ServiceLocator;
pub use stage::InitStage;
pub use traits::{MIN_INIT_STAGES, Module};
