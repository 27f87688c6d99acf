//! Module-side battery access: registration and drain dispatch.

use std::fmt;

use tracing::debug;

use crate::error::{RegistrationError, UsageError};

use super::amount::DrainAmount;
use super::service::{AccountSet, DeviceId, SharedBattery};

/// A module's binding to its host's battery.
///
/// The battery handle is attached once during stage 0; the account set is
/// obtained by [`register_with_battery`](Self::register_with_battery).
#[derive(Default)]
pub struct BatteryClient {
    battery: Option<SharedBattery>,
    accounts: Option<AccountSet>,
}

impl fmt::Debug for BatteryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatteryClient")
            .field("attached", &self.battery.is_some())
            .field("accounts", &self.accounts)
            .finish()
    }
}

impl BatteryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, battery: Option<SharedBattery>) {
        self.battery = battery;
    }

    /// Whether the host has a battery.
    pub fn has_battery(&self) -> bool {
        self.battery.is_some()
    }

    pub fn accounts(&self) -> Option<&AccountSet> {
        self.accounts.as_ref()
    }

    /// Device id assigned by the battery, once registered.
    pub fn device_id(&self) -> Option<DeviceId> {
        self.accounts.as_ref().map(AccountSet::device)
    }

    /// Requests `num_accounts` consumption accounts tagged with `name`.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::InvalidAccountCount`] if `num_accounts <= 0`
    /// - [`RegistrationError::NoBattery`] if the host has no battery
    /// - [`RegistrationError::AlreadyRegistered`] on a second registration
    pub fn register_with_battery(
        &mut self,
        name: &str,
        num_accounts: i32,
    ) -> Result<&AccountSet, RegistrationError> {
        let count = usize::try_from(num_accounts)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(RegistrationError::InvalidAccountCount(num_accounts))?;
        let battery = self.battery.as_ref().ok_or(RegistrationError::NoBattery)?;
        if self.accounts.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }
        let set = battery.borrow_mut().register_accounts(name, count);
        debug!(name, device = %set.device(), count, "registered with battery");
        Ok(self.accounts.insert(set))
    }

    /// Draws `amount` on the account selected by `activity`.
    ///
    /// # Errors
    ///
    /// - [`UsageError::NotRegistered`] before registration
    /// - [`UsageError::ActivityOutOfRange`] if `activity` is not a
    ///   registered account
    ///
    /// In both cases the battery is not touched.
    pub fn drain(&self, amount: DrainAmount, activity: usize) -> Result<(), UsageError> {
        let (battery, set) = self.checked(activity)?;
        let mut battery = battery.borrow_mut();
        match amount {
            DrainAmount::Current(a) => battery.drain_current(set, activity, a),
            DrainAmount::Energy(j) => battery.drain_energy(set, activity, j),
        }
        Ok(())
    }

    /// Sets the current drawn by `activity`.
    pub fn drain_current(&self, amount: f64, activity: usize) -> Result<(), UsageError> {
        self.drain(DrainAmount::Current(amount), activity)
    }

    /// Consumes `amount` of energy on `activity`.
    pub fn drain_energy(&self, amount: f64, activity: usize) -> Result<(), UsageError> {
        self.drain(DrainAmount::Energy(amount), activity)
    }

    fn checked(&self, activity: usize) -> Result<(&SharedBattery, &AccountSet), UsageError> {
        let (Some(battery), Some(set)) = (self.battery.as_ref(), self.accounts.as_ref()) else {
            return Err(UsageError::NotRegistered);
        };
        if activity >= set.accounts() {
            return Err(UsageError::ActivityOutOfRange {
                activity,
                accounts: set.accounts(),
            });
        }
        Ok((battery, set))
    }
}
