//! Builds a runtime from a scenario, initializes it and replays the script.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::battery::{AccountingBattery, SharedBattery};
use crate::config::{ConfigError, ModuleConfig, ScenarioConfig};
use crate::error::ModuleError;
use crate::module::{Module, ModuleCore, ServiceLocator};
use crate::modules::{EnergyMeter, RadioModule, RadioState};
use crate::notify::{BbValue, Blackboard};
use crate::sim::clock::Clock;
use crate::sim::runtime::Runtime;
use crate::sim::script::PublishScript;
use crate::sim::trace::TraceKind;
use crate::topology::{self, HostProfile, ModuleId, Topology, TopologyProvider};

/// Failures while building or running a scenario.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid scenario ({} errors), first: {}", .0.len(), first_message(.0))]
    Invalid(Vec<ConfigError>),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error("script step {step}: unknown host \"{host}\"")]
    UnknownHost { step: usize, host: String },
    #[error("module \"{module}\": unknown kind \"{kind}\"")]
    UnknownKind { module: String, kind: String },
    #[error("module \"{module}\": {message}")]
    InvalidState { module: String, message: String },
}

fn first_message(errors: &[ConfigError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

/// One battery account in the final ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub host: String,
    pub device: u32,
    pub owner: String,
    pub account: usize,
    pub current_a: f64,
    pub peak_current_a: f64,
    pub current_updates: u64,
    pub energy_j: f64,
    pub energy_updates: u64,
}

/// Final state of one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub name: String,
    /// Log name of the enclosing host.
    pub log_name: String,
    pub kind: String,
    /// Radio state or meter delivery count.
    pub detail: String,
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub script_steps: usize,
    pub publications: u64,
    pub deliveries: usize,
    pub trace_len: usize,
    pub modules: Vec<ModuleSummary>,
    pub ledger: Vec<LedgerRow>,
}

/// A built scenario before it runs.
pub struct Simulation {
    runtime: Runtime,
    batteries: Vec<(String, Rc<RefCell<AccountingBattery>>)>,
    hosts: Vec<(String, ModuleId)>,
    kinds: Vec<(ModuleId, String)>,
    script: PublishScript,
    seed: u64,
}

impl Simulation {
    /// Validates `cfg` and lays out its topology and modules.
    ///
    /// # Errors
    ///
    /// [`RunError::Invalid`] with every validation error, or a module error
    /// if a module cannot be added.
    pub fn build(cfg: &ScenarioConfig) -> Result<Self, RunError> {
        let errors = cfg.validate();
        if !errors.is_empty() {
            return Err(RunError::Invalid(errors));
        }

        let mut topology = Topology::new();
        let mut locator = ServiceLocator::new(Blackboard::shared());
        let mut batteries = Vec::new();
        let mut hosts = Vec::new();
        let mut placed: Vec<(ModuleId, &ModuleConfig)> = Vec::new();

        for host in &cfg.hosts {
            let profile = match &host.logging_name {
                Some(name) => HostProfile::with_logging_name(host.index, name.clone()),
                None => HostProfile::new(host.index),
            };
            let host_id = topology.add_host(host.name.clone(), profile, None);
            hosts.push((host.name.clone(), host_id));
            if host.battery {
                let battery = Rc::new(RefCell::new(AccountingBattery::new(topology::log_name(
                    &topology, host_id,
                ))));
                let shared: SharedBattery = battery.clone();
                locator.attach_battery(host_id, shared);
                batteries.push((host.name.clone(), battery));
            }
            for module in &host.modules {
                let id = topology.add_module(module.name.clone(), Some(host_id));
                placed.push((id, module));
            }
        }

        let mut runtime = Runtime::new(topology, locator);
        let mut kinds = Vec::new();
        for (id, module) in placed {
            let debug = module.debug.unwrap_or(cfg.simulation.debug);
            let core = ModuleCore::new(id).with_debug(debug);
            runtime.add_module(instantiate(core, module)?)?;
            kinds.push((id, module.kind.clone()));
        }

        let host_names: Vec<String> = hosts.iter().map(|(name, _)| name.clone()).collect();
        let script = if cfg.script.publish.is_empty() {
            PublishScript::random(
                cfg.simulation.seed,
                cfg.script.steps,
                &host_names,
                &cfg.script.category,
                &cfg.script.values,
            )
        } else {
            PublishScript::new(cfg.script.publish.clone())
        };

        Ok(Self {
            runtime,
            batteries,
            hosts,
            kinds,
            script,
            seed: cfg.simulation.seed,
        })
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn script(&self) -> &PublishScript {
        &self.script
    }

    /// Id of the host named `name`.
    pub fn host(&self, name: &str) -> Option<ModuleId> {
        self.hosts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Initializes every module, then plays one script entry per clock step.
    ///
    /// # Errors
    ///
    /// The first initialization or publication error, or
    /// [`RunError::UnknownHost`] for a script entry naming no host.
    pub fn run(mut self) -> Result<(Runtime, RunReport), RunError> {
        self.runtime.initialize()?;

        let mut clock = Clock::new(self.script.len());
        while let Some(step) = clock.tick() {
            let Some(entry) = self.script.get(step) else {
                break;
            };
            let scope = self.host(&entry.host).ok_or_else(|| RunError::UnknownHost {
                step,
                host: entry.host.clone(),
            })?;
            let category = self.runtime.board().borrow_mut().category(&entry.category);
            let delivered = self.runtime.publish(
                category,
                BbValue::Text(entry.value.clone()),
                Some(scope),
            )?;
            debug!(step, host = %entry.host, value = %entry.value, delivered, "script step");
        }

        let report = self.report();
        info!(
            publications = report.publications,
            deliveries = report.deliveries,
            "scenario finished"
        );
        Ok((self.runtime, report))
    }

    fn report(&self) -> RunReport {
        let deliveries = self
            .runtime
            .trace()
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Delivered { .. }))
            .count();

        let modules = self
            .kinds
            .iter()
            .map(|(id, kind)| ModuleSummary {
                id: *id,
                name: self
                    .runtime
                    .topology()
                    .structural_name(*id)
                    .unwrap_or(topology::UNKNOWN_LOG_NAME)
                    .to_string(),
                log_name: topology::log_name(self.runtime.topology(), *id),
                kind: kind.clone(),
                detail: self.detail(*id),
            })
            .collect();

        let mut ledger = Vec::new();
        for (host, battery) in &self.batteries {
            for device in battery.borrow().devices() {
                for (account, totals) in device.accounts.iter().enumerate() {
                    ledger.push(LedgerRow {
                        host: host.clone(),
                        device: device.device.raw(),
                        owner: device.owner.clone(),
                        account,
                        current_a: totals.current_a,
                        peak_current_a: totals.peak_current_a,
                        current_updates: totals.current_updates,
                        energy_j: totals.energy_j,
                        energy_updates: totals.energy_updates,
                    });
                }
            }
        }

        RunReport {
            seed: self.seed,
            script_steps: self.script.len(),
            publications: self.runtime.board().borrow().publications(),
            deliveries,
            trace_len: self.runtime.trace().len(),
            modules,
            ledger,
        }
    }

    fn detail(&self, id: ModuleId) -> String {
        if let Some(radio) = self.runtime.module::<RadioModule>(id) {
            return format!("state={} transitions={}", radio.state(), radio.transitions());
        }
        if let Some(meter) = self.runtime.module::<EnergyMeter>(id) {
            return format!("deliveries={}", meter.deliveries());
        }
        String::new()
    }
}

fn instantiate(core: ModuleCore, cfg: &ModuleConfig) -> Result<Box<dyn Module>, RunError> {
    match cfg.kind.as_str() {
        "meter" => Ok(Box::new(EnergyMeter::new(
            core,
            cfg.name.clone(),
            cfg.accounts.unwrap_or(1),
        ))),
        "radio" => {
            let state = match cfg.initial_state.as_deref() {
                Some(s) => s.parse::<RadioState>().map_err(|message| RunError::InvalidState {
                    module: cfg.name.clone(),
                    message,
                })?,
                None => RadioState::default(),
            };
            Ok(Box::new(RadioModule::new(core, cfg.name.clone()).with_state(state)))
        }
        other => Err(RunError::UnknownKind {
            module: cfg.name.clone(),
            kind: other.to_string(),
        }),
    }
}

/// Builds and runs `cfg` in one call.
///
/// # Errors
///
/// See [`Simulation::build`] and [`Simulation::run`].
pub fn run_scenario(cfg: &ScenarioConfig) -> Result<(Runtime, RunReport), RunError> {
    Simulation::build(cfg)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_scenario_is_rejected_before_build() {
        let mut cfg = ScenarioConfig::demo();
        cfg.hosts[1].index = 0;
        let err = Simulation::build(&cfg).err();
        assert!(matches!(err, Some(RunError::Invalid(ref e)) if !e.is_empty()));
    }

    #[test]
    fn instantiate_rejects_unknown_kind_and_state() {
        let mut cfg = ScenarioConfig::single_host().hosts[0].modules[0].clone();
        cfg.kind = "modem".into();
        let err = instantiate(ModuleCore::new(ModuleId::new(1)), &cfg).err();
        assert!(matches!(err, Some(RunError::UnknownKind { ref kind, .. }) if kind == "modem"));

        cfg.kind = "radio".into();
        cfg.initial_state = Some("standby".into());
        let err = instantiate(ModuleCore::new(ModuleId::new(1)), &cfg).err();
        assert!(matches!(err, Some(RunError::InvalidState { .. })));

        cfg.initial_state = Some("tx".into());
        assert!(instantiate(ModuleCore::new(ModuleId::new(1)), &cfg).is_ok());
    }

    #[test]
    fn single_host_runs_script_in_order() {
        let (runtime, report) = run_scenario(&ScenarioConfig::single_host()).unwrap();
        assert_eq!(report.script_steps, 3);
        let radio_id = report.modules[0].id;
        let radio = runtime.module::<RadioModule>(radio_id).unwrap();
        assert_eq!(radio.state(), RadioState::Sleep);
        assert_eq!(radio.transitions(), 3);
    }

    #[test]
    fn ledger_has_one_row_per_account() {
        let (_, report) = run_scenario(&ScenarioConfig::single_host()).unwrap();
        assert_eq!(report.ledger.len(), RadioState::COUNT);
        assert!(report.ledger.iter().all(|r| r.owner == "nic"));
    }

    #[test]
    fn same_seed_same_report() {
        let a = run_scenario(&ScenarioConfig::demo()).unwrap().1;
        let b = run_scenario(&ScenarioConfig::demo()).unwrap().1;
        assert_eq!(a, b);
    }
}
