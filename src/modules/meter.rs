//! Energy meter: counts radio-state notifications and charges a fixed
//! energy per notification.

use std::any::Any;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{ModuleResult, RegistrationError};
use crate::module::{InitContext, Module, ModuleCore, NotifyContext};
use crate::notify::{BbItem, Category, NotificationReceiver};
use crate::topology::ModuleId;

use super::radio::RADIO_STATE_CATEGORY;

/// Energy booked per observed notification (J).
pub const ENERGY_PER_NOTIFICATION_J: f64 = 0.001;

#[derive(Debug)]
pub struct EnergyMeter {
    core: ModuleCore,
    name: String,
    accounts: i32,
    category: Option<Category>,
    per_scope: BTreeMap<Option<ModuleId>, usize>,
}

impl EnergyMeter {
    /// Meter registering `accounts` battery accounts. Energy is always
    /// booked on account 0.
    pub fn new(core: ModuleCore, name: impl Into<String>, accounts: i32) -> Self {
        Self {
            core,
            name: name.into(),
            accounts,
            category: None,
            per_scope: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Notifications seen, keyed by scope.
    pub fn per_scope(&self) -> &BTreeMap<Option<ModuleId>, usize> {
        &self.per_scope
    }

    pub fn deliveries(&self) -> usize {
        self.per_scope.values().sum()
    }
}

impl NotificationReceiver for EnergyMeter {
    fn receive_bb_item(
        &mut self,
        ctx: &mut NotifyContext<'_>,
        category: Category,
        details: &dyn BbItem,
        scope: Option<ModuleId>,
    ) {
        if Some(category) != self.category {
            return;
        }
        *self.per_scope.entry(scope).or_default() += 1;
        if self.core.debug() {
            debug!(module = %ctx.log_name(), ?details, ?scope, "metered");
        }
        if self.core.battery().accounts().is_none() {
            return;
        }
        if let Err(e) = self.core.drain_energy(ENERGY_PER_NOTIFICATION_J, 0) {
            warn!(module = %ctx.log_name(), error = %e, "drain rejected");
        }
    }
}

impl Module for EnergyMeter {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>, stage: u32) -> ModuleResult<()> {
        if stage == 0 {
            let category = ctx.category(RADIO_STATE_CATEGORY);
            ctx.subscribe(category)?;
            self.category = Some(category);
            match self.core.register_with_battery(&self.name, self.accounts) {
                Ok(_) | Err(RegistrationError::NoBattery) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
