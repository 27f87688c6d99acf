//! Error types for module lifecycle, notification and battery operations.
//!
//! Every fallible operation in the crate returns one of these enums. None of
//! them are retried: they either signal routine absence (an unattached
//! module) or a broken usage contract.

use thiserror::Error;

use crate::notify::Category;
use crate::topology::ModuleId;

/// Failures of `register_with_battery`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The requested number of accounts was zero or negative.
    #[error("invalid account count {0}, must be > 0")]
    InvalidAccountCount(i32),
    /// No battery is attached to the module's host.
    #[error("no battery attached to this host")]
    NoBattery,
    /// The module already holds an account set.
    #[error("module is already registered with the battery")]
    AlreadyRegistered,
}

/// Contract violations when drawing from the battery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// Drain was called before a successful registration.
    #[error("drain called before registering with the battery")]
    NotRegistered,
    /// The activity does not name one of the registered accounts.
    #[error("activity {activity} out of range, {accounts} accounts registered")]
    ActivityOutOfRange { activity: usize, accounts: usize },
}

/// Bulletin board phase violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Subscriptions are only accepted during stage 0.
    #[error("{module} cannot subscribe to {category}: subscriptions are closed")]
    SubscriptionClosed { module: ModuleId, category: Category },
    /// Publishing before every module completed stage 0.
    #[error("cannot publish {category}: delivery opens after stage 0")]
    DeliveryNotOpen { category: Category },
}

/// Top-level error for module operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// The module is not placed under any host.
    #[error("{0} is not attached to a host")]
    Unattached(ModuleId),
    /// The id does not name a live module.
    #[error("{0} is not a live module")]
    UnknownModule(ModuleId),
    /// A module with this id was already added to the runtime.
    #[error("{0} was already added")]
    DuplicateModule(ModuleId),
    /// Modules can only be added before initialization starts.
    #[error("cannot add {0}: initialization already ran")]
    LateModule(ModuleId),
    /// An initialization stage was entered out of order.
    #[error("{module}: stage {requested} entered out of order (next expected: {expected:?})")]
    StageOrder {
        module: ModuleId,
        requested: u32,
        expected: Option<u32>,
    },
    /// A module declared fewer than the two required init stages.
    #[error("{module} declares {declared} init stages, at least {required} are required")]
    TooFewStages {
        module: ModuleId,
        declared: u32,
        required: u32,
    },
    /// Handler publications kept cascading past the runtime's limit.
    #[error("publication cascade cut off at {category} after {limit} publications")]
    CascadeLimit { category: Category, limit: usize },
    /// A stage hook failed earlier; the runtime cannot be initialized again.
    #[error("initialization already failed, the runtime must be rebuilt")]
    InitializationFailed,
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Convenience alias for `Result<T, ModuleError>`.
pub type ModuleResult<T> = Result<T, ModuleError>;
