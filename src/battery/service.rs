//! The battery service interface modules draw from.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

/// Identifier the battery assigns to a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DeviceId(u32);

impl DeviceId {
    pub fn new(id: u32) -> Self {
        DeviceId(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Handle to a set of consumption accounts owned by the battery.
///
/// Modules keep the handle and pass it back on every drain; only the
/// battery interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSet {
    device: DeviceId,
    accounts: usize,
}

impl AccountSet {
    pub fn new(device: DeviceId, accounts: usize) -> Self {
        Self { device, accounts }
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Number of accounts in the set; valid activities are `0..accounts`.
    pub fn accounts(&self) -> usize {
        self.accounts
    }
}

/// A battery that accumulates consumption reported by modules.
///
/// Callers validate the activity against the account set before drawing,
/// so implementations may assume `activity < set.accounts()`.
pub trait BatteryService {
    /// Allocates `count` accounts for `owner`. `count` is always > 0.
    fn register_accounts(&mut self, owner: &str, count: usize) -> AccountSet;

    /// Sets the current drawn by `activity` of `set`.
    fn drain_current(&mut self, set: &AccountSet, activity: usize, amount: f64);

    /// Consumes `amount` of energy on `activity` of `set`.
    fn drain_energy(&mut self, set: &AccountSet, activity: usize, amount: f64);
}

/// Shared handle to a host's battery.
pub type SharedBattery = Rc<RefCell<dyn BatteryService>>;
