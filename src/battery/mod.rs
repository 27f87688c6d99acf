//! Battery accounting: drain amounts, the service interface, an accounting
//! implementation and the module-side client.

pub mod amount;
pub mod client;
/// Per-account consumption ledger.
pub mod ledger;
pub mod service;

pub use amount::DrainAmount;
pub use client::BatteryClient;
pub use ledger::{AccountTotals, AccountingBattery, DeviceLedger};
pub use service::{AccountSet, BatteryService, DeviceId, SharedBattery};
