use serde::Serialize;
use tracing::debug;

use super::service::{AccountSet, BatteryService, DeviceId};

/// Consumption totals of one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountTotals {
    /// Most recent current set on this account (A).
    pub current_a: f64,
    /// Highest current ever set on this account (A).
    pub peak_current_a: f64,
    /// Number of current drains received.
    pub current_updates: u64,
    /// Accumulated discrete energy (J).
    pub energy_j: f64,
    /// Number of energy drains received.
    pub energy_updates: u64,
}

/// Accounts registered by one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceLedger {
    pub device: DeviceId,
    pub owner: String,
    pub accounts: Vec<AccountTotals>,
}

impl DeviceLedger {
    /// Sum of the present current over all accounts (A).
    pub fn total_current_a(&self) -> f64 {
        self.accounts.iter().map(|a| a.current_a).sum()
    }

    /// Sum of discrete energy over all accounts (J).
    pub fn total_energy_j(&self) -> f64 {
        self.accounts.iter().map(|a| a.energy_j).sum()
    }
}

/// A battery that books every drain per device and account.
///
/// It has no capacity and never depletes: it records what was asked of it,
/// which is all modules can observe through [`BatteryService`].
#[derive(Debug, Clone, Default)]
pub struct AccountingBattery {
    /// Name used in reports (usually the host's log name).
    pub name: String,
    devices: Vec<DeviceLedger>,
}

impl AccountingBattery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            devices: Vec::new(),
        }
    }

    /// All registered devices in registration order.
    pub fn devices(&self) -> &[DeviceLedger] {
        &self.devices
    }

    pub fn device(&self, id: DeviceId) -> Option<&DeviceLedger> {
        self.devices.get(id.raw() as usize)
    }

    /// Total accounts allocated across devices.
    pub fn account_count(&self) -> usize {
        self.devices.iter().map(|d| d.accounts.len()).sum()
    }

    fn account_mut(&mut self, set: &AccountSet, activity: usize) -> Option<&mut AccountTotals> {
        self.devices
            .get_mut(set.device().raw() as usize)
            .and_then(|d| d.accounts.get_mut(activity))
    }
}

impl BatteryService for AccountingBattery {
    fn register_accounts(&mut self, owner: &str, count: usize) -> AccountSet {
        let device = DeviceId::new(self.devices.len() as u32);
        self.devices.push(DeviceLedger {
            device,
            owner: owner.to_string(),
            accounts: vec![AccountTotals::default(); count],
        });
        debug!(battery = %self.name, %device, owner, count, "registered accounts");
        AccountSet::new(device, count)
    }

    fn drain_current(&mut self, set: &AccountSet, activity: usize, amount: f64) {
        if let Some(acc) = self.account_mut(set, activity) {
            acc.current_a = amount;
            acc.peak_current_a = acc.peak_current_a.max(amount);
            acc.current_updates += 1;
        }
    }

    fn drain_energy(&mut self, set: &AccountSet, activity: usize, amount: f64) {
        if let Some(acc) = self.account_mut(set, activity) {
            acc.energy_j += amount;
            acc.energy_updates += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_allocates_requested_accounts() {
        let mut battery = AccountingBattery::new("node0");
        let a = battery.register_accounts("radio", 3);
        let b = battery.register_accounts("meter", 1);
        assert_eq!(a.accounts(), 3);
        assert_ne!(a.device(), b.device());
        assert_eq!(battery.account_count(), 4);
        assert_eq!(battery.device(a.device()).map(|d| d.owner.as_str()), Some("radio"));
    }

    #[test]
    fn current_replaces_and_tracks_peak() {
        let mut battery = AccountingBattery::new("node0");
        let set = battery.register_accounts("radio", 2);
        battery.drain_current(&set, 1, 0.02);
        battery.drain_current(&set, 1, 0.005);
        let acc = &battery.devices()[0].accounts[1];
        assert_eq!(acc.current_a, 0.005);
        assert_eq!(acc.peak_current_a, 0.02);
        assert_eq!(acc.current_updates, 2);
        assert_eq!(battery.devices()[0].accounts[0], AccountTotals::default());
    }

    #[test]
    fn energy_accumulates() {
        let mut battery = AccountingBattery::new("node0");
        let set = battery.register_accounts("meter", 1);
        battery.drain_energy(&set, 0, 1.5);
        battery.drain_energy(&set, 0, 0.5);
        let dev = &battery.devices()[0];
        assert!((dev.total_energy_j() - 2.0).abs() < 1e-12);
        assert_eq!(dev.accounts[0].energy_updates, 2);
        assert_eq!(dev.total_current_a(), 0.0);
    }

    #[test]
    fn foreign_account_set_is_ignored() {
        let mut battery = AccountingBattery::new("node0");
        let stray = AccountSet::new(DeviceId::new(9), 1);
        battery.drain_energy(&stray, 0, 1.0);
        assert!(battery.devices().is_empty());
    }
}
