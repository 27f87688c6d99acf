//! Built-in modules used by scenarios: a radio and an energy meter.

pub mod meter;
pub mod radio;

pub use meter::{ENERGY_PER_NOTIFICATION_J, EnergyMeter};
pub use radio::{RADIO_STATE_CATEGORY, RadioModule, RadioState};
