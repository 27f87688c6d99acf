//! State shared by every module: identity, lifecycle and service handles.

use tracing::{debug, warn};

use crate::battery::{AccountSet, BatteryClient, DrainAmount};
use crate::error::{ModuleError, ModuleResult, RegistrationError, UsageError};
use crate::notify::SharedBoard;
use crate::topology::{self, ModuleId, TopologyProvider};

use super::locator::ServiceLocator;
use super::stage::InitStage;

/// The part of a module the runtime manages.
///
/// Concrete modules embed one and expose it through
/// [`Module::core`](super::Module::core). Service handles are resolved in
/// stage 0 and never reassigned afterwards.
#[derive(Debug)]
pub struct ModuleCore {
    id: ModuleId,
    debug: bool,
    completed: u32,
    host: Option<ModuleId>,
    utility: Option<SharedBoard>,
    battery: BatteryClient,
}

impl ModuleCore {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            debug: false,
            completed: 0,
            host: None,
            utility: None,
            battery: BatteryClient::new(),
        }
    }

    /// Enables per-module debug diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Debug switch for this module's own diagnostics.
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn stage(&self) -> InitStage {
        InitStage::after(self.completed)
    }

    /// Number of init stages completed so far.
    pub fn completed_stages(&self) -> u32 {
        self.completed
    }

    /// Host resolved during stage 0.
    pub fn host(&self) -> Option<ModuleId> {
        self.host
    }

    /// Board handle resolved during stage 0.
    pub fn utility(&self) -> Option<&SharedBoard> {
        self.utility.as_ref()
    }

    pub fn battery(&self) -> &BatteryClient {
        &self.battery
    }

    // ── Topology queries ─────────────────────────────────────

    /// Nearest enclosing host in the current topology.
    pub fn find_host<T: TopologyProvider + ?Sized>(&self, topology: &T) -> Option<ModuleId> {
        topology::find_host(topology, self.id)
    }

    /// Alias of [`find_host`](Self::find_host).
    pub fn get_node<T: TopologyProvider + ?Sized>(&self, topology: &T) -> Option<ModuleId> {
        self.find_host(topology)
    }

    /// # Errors
    ///
    /// [`ModuleError::Unattached`] when no host encloses this module.
    pub fn host_index<T: TopologyProvider + ?Sized>(&self, topology: &T) -> ModuleResult<usize> {
        topology::host_index(topology, self.id)
    }

    pub fn log_name<T: TopologyProvider + ?Sized>(&self, topology: &T) -> String {
        topology::log_name(topology, self.id)
    }

    pub fn get_log_name<T: TopologyProvider + ?Sized>(&self, topology: &T, id: ModuleId) -> String {
        topology::get_log_name(topology, id)
    }

    // ── Battery ──────────────────────────────────────────────

    /// See [`BatteryClient::register_with_battery`].
    pub fn register_with_battery(
        &mut self,
        name: &str,
        num_accounts: i32,
    ) -> Result<&AccountSet, RegistrationError> {
        let module = self.id;
        self.battery
            .register_with_battery(name, num_accounts)
            .inspect_err(|e| warn!(%module, name, error = %e, "battery registration failed"))
    }

    pub fn drain(&self, amount: DrainAmount, activity: usize) -> Result<(), UsageError> {
        self.battery.drain(amount, activity)
    }

    pub fn drain_current(&self, amount: f64, activity: usize) -> Result<(), UsageError> {
        self.battery.drain_current(amount, activity)
    }

    pub fn drain_energy(&self, amount: f64, activity: usize) -> Result<(), UsageError> {
        self.battery.drain_energy(amount, activity)
    }

    // ── Lifecycle ────────────────────────────────────────────

    /// Checks ordering and, for stage 0, resolves the shared services.
    pub(crate) fn enter_stage<T: TopologyProvider + ?Sized>(
        &mut self,
        stage: u32,
        topology: &T,
        locator: &ServiceLocator,
    ) -> ModuleResult<()> {
        if stage != self.completed {
            return Err(ModuleError::StageOrder {
                module: self.id,
                requested: stage,
                expected: Some(self.completed),
            });
        }
        if stage == 0 {
            self.host = self.find_host(topology);
            self.utility = Some(locator.utility());
            self.battery
                .attach(self.host.and_then(|h| locator.battery_for(h)));
            if self.debug {
                debug!(
                    module = %self.log_name(topology),
                    host = ?self.host,
                    battery = self.battery.has_battery(),
                    "services resolved"
                );
            }
        }
        Ok(())
    }

    pub(crate) fn complete_stage(&mut self, stage: u32) {
        debug_assert_eq!(stage, self.completed);
        self.completed += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::battery::{AccountingBattery, SharedBattery};
    use crate::topology::{HostProfile, Topology};

    fn setup() -> (Topology, ServiceLocator, ModuleId, ModuleId) {
        let mut topo = Topology::new();
        let host = topo.add_host("node", HostProfile::new(0), None);
        let radio = topo.add_module("radio", Some(host));
        let mut locator = ServiceLocator::default();
        let battery: SharedBattery = Rc::new(RefCell::new(AccountingBattery::new("node")));
        locator.attach_battery(host, battery);
        (topo, locator, host, radio)
    }

    #[test]
    fn stage_zero_resolves_host_and_battery() {
        let (topo, locator, host, radio) = setup();
        let mut core = ModuleCore::new(radio);
        core.enter_stage(0, &topo, &locator).unwrap();
        core.complete_stage(0);
        assert_eq!(core.host(), Some(host));
        assert!(core.utility().is_some());
        assert!(core.battery().has_battery());
        assert_eq!(core.stage(), InitStage::Stage0Done);
    }

    #[test]
    fn stages_must_run_in_order() {
        let (topo, locator, _, radio) = setup();
        let mut core = ModuleCore::new(radio);
        let err = core.enter_stage(1, &topo, &locator);
        assert_eq!(
            err,
            Err(ModuleError::StageOrder {
                module: radio,
                requested: 1,
                expected: Some(0),
            })
        );
        core.enter_stage(0, &topo, &locator).unwrap();
        core.complete_stage(0);
        assert!(core.enter_stage(0, &topo, &locator).is_err());
    }

    #[test]
    fn unattached_module_gets_no_battery() {
        let (mut topo, locator, _, _) = setup();
        let loose = topo.add_module("loose", None);
        let mut core = ModuleCore::new(loose);
        core.enter_stage(0, &topo, &locator).unwrap();
        assert_eq!(core.host(), None);
        assert!(!core.battery().has_battery());
        assert_eq!(
            core.register_with_battery("loose", 1).err(),
            Some(RegistrationError::NoBattery)
        );
        assert_eq!(core.host_index(&topo), Err(ModuleError::Unattached(loose)));
    }

    #[test]
    fn drain_delegates_after_registration() {
        let (topo, locator, _, radio) = setup();
        let mut core = ModuleCore::new(radio);
        core.enter_stage(0, &topo, &locator).unwrap();
        core.register_with_battery("radio", 2).unwrap();
        assert_eq!(core.drain_current(0.01, 1), Ok(()));
        assert_eq!(
            core.drain_energy(1.0, 2),
            Err(UsageError::ActivityOutOfRange {
                activity: 2,
                accounts: 2
            })
        );
    }
}
