//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use netsim_base::battery::{AccountingBattery, SharedBattery};
use netsim_base::error::{BoardError, ModuleResult};
use netsim_base::module::{InitContext, Module, ModuleCore, NotifyContext, ServiceLocator};
use netsim_base::notify::{BbItem, BbValue, Blackboard, Category, NotificationReceiver};
use netsim_base::sim::Runtime;
use netsim_base::topology::{HostProfile, ModuleId, Topology};

/// What a [`Recorder`] observed, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Stage {
        module: ModuleId,
        stage: u32,
    },
    Delivered {
        module: ModuleId,
        category: Category,
        value: Option<i64>,
        scope: Option<ModuleId>,
    },
    LateSubscribe {
        module: ModuleId,
        result: Result<(), BoardError>,
    },
    EarlyPublish {
        module: ModuleId,
        result: Result<(), BoardError>,
    },
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Test module that records every call into a shared log.
pub struct Recorder {
    core: ModuleCore,
    log: Log,
    stages: u32,
    subscribe: Vec<Category>,
    publish_in_stage1: Option<(Category, i64)>,
    reply: Option<(Category, Category)>,
    try_late_subscribe: bool,
    try_early_publish: bool,
}

impl Recorder {
    pub fn new(id: ModuleId, log: &Log) -> Self {
        Self {
            core: ModuleCore::new(id),
            log: log.clone(),
            stages: 2,
            subscribe: Vec::new(),
            publish_in_stage1: None,
            reply: None,
            try_late_subscribe: false,
            try_early_publish: false,
        }
    }

    pub fn subscribing(mut self, categories: &[Category]) -> Self {
        self.subscribe.extend_from_slice(categories);
        self
    }

    pub fn stages(mut self, stages: u32) -> Self {
        self.stages = stages;
        self
    }

    pub fn publishing(mut self, category: Category, value: i64) -> Self {
        self.publish_in_stage1 = Some((category, value));
        self
    }

    /// On a delivery of `on`, publish `with` carrying the same value.
    pub fn replying(mut self, on: Category, with: Category) -> Self {
        self.reply = Some((on, with));
        self
    }

    pub fn late_subscriber(mut self) -> Self {
        self.try_late_subscribe = true;
        self
    }

    pub fn early_publisher(mut self) -> Self {
        self.try_early_publish = true;
        self
    }
}

impl NotificationReceiver for Recorder {
    fn receive_bb_item(
        &mut self,
        ctx: &mut NotifyContext<'_>,
        category: Category,
        details: &dyn BbItem,
        scope: Option<ModuleId>,
    ) {
        let value = match details.downcast_ref::<BbValue>() {
            Some(BbValue::Int(v)) => Some(*v),
            _ => None,
        };
        self.log.borrow_mut().push(Event::Delivered {
            module: ctx.module(),
            category,
            value,
            scope,
        });
        if let Some((on, with)) = self.reply {
            if on == category {
                let _ = ctx.publish(with, BbValue::Int(value.unwrap_or_default()), scope);
            }
        }
    }
}

impl Module for Recorder {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn num_init_stages(&self) -> u32 {
        self.stages
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>, stage: u32) -> ModuleResult<()> {
        let module = ctx.module();
        self.log.borrow_mut().push(Event::Stage { module, stage });
        match stage {
            0 => {
                for category in self.subscribe.clone() {
                    ctx.subscribe(category)?;
                }
                if self.try_early_publish {
                    let result = ctx.publish(Category::new(0), BbValue::Empty, None);
                    self.log
                        .borrow_mut()
                        .push(Event::EarlyPublish { module, result });
                }
            }
            1 => {
                if self.try_late_subscribe {
                    let result = ctx.subscribe(Category::new(0));
                    self.log
                        .borrow_mut()
                        .push(Event::LateSubscribe { module, result });
                }
                if let Some((category, value)) = self.publish_in_stage1 {
                    ctx.publish(category, BbValue::Int(value), None)?;
                }
            }
            _ => {}
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

/// A topology with one host (`node0`, index 0) and `modules` plain modules
/// inside it. Returns the host id and the module ids.
pub fn one_host(modules: usize) -> (Topology, ModuleId, Vec<ModuleId>) {
    let mut topo = Topology::new();
    let host = topo.add_host("node0", HostProfile::new(0), None);
    let ids = (0..modules)
        .map(|i| topo.add_module(format!("m{i}"), Some(host)))
        .collect();
    (topo, host, ids)
}

/// Runtime over `topology` with a fresh board and no batteries.
pub fn runtime(topology: Topology) -> Runtime {
    Runtime::new(topology, ServiceLocator::new(Blackboard::shared()))
}

/// Attaches a fresh accounting battery for `host` and returns a handle to
/// read its ledger back.
pub fn attach_battery(
    locator: &mut ServiceLocator,
    host: ModuleId,
    name: &str,
) -> Rc<RefCell<AccountingBattery>> {
    let battery = Rc::new(RefCell::new(AccountingBattery::new(name)));
    let shared: SharedBattery = battery.clone();
    locator.attach_battery(host, shared);
    battery
}
