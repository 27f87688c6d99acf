//! Runtime that drives the init protocol and fans out notifications.

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::{ModuleError, ModuleResult};
use crate::module::{
    Effects, InitContext, MIN_INIT_STAGES, Module, NotifyContext, Publication, ServiceLocator,
};
use crate::notify::{BbItem, Category, SharedBoard};
use crate::topology::{ModuleId, Topology, TopologyProvider};

use super::trace::{TraceEntry, TraceKind};

/// Default cap on publications fanned out for one outer publish, counting
/// the outer one and everything handlers publish in response.
pub const DEFAULT_CASCADE_LIMIT: usize = 10_000;

/// Owns the modules of a simulation and dispatches into them.
///
/// Every call into a module runs to completion before the next one starts.
/// Effects a module requests through its context (subscriptions,
/// publications) are applied after its call returns, so no handler is ever
/// re-entered.
///
/// A failed stage hook is terminal: the runtime refuses further
/// initialization and publications and has to be rebuilt.
pub struct Runtime {
    topology: Topology,
    locator: ServiceLocator,
    modules: BTreeMap<ModuleId, Box<dyn Module>>,
    order: Vec<ModuleId>,
    trace: Vec<TraceEntry>,
    next_seq: u64,
    initialized: bool,
    failed: bool,
    cascade_limit: usize,
}

impl Runtime {
    pub fn new(topology: Topology, locator: ServiceLocator) -> Self {
        Self {
            topology,
            locator,
            modules: BTreeMap::new(),
            order: Vec::new(),
            trace: Vec::new(),
            next_seq: 0,
            initialized: false,
            failed: false,
            cascade_limit: DEFAULT_CASCADE_LIMIT,
        }
    }

    /// Caps how many publications a single outer publish may fan out.
    pub fn with_cascade_limit(mut self, limit: usize) -> Self {
        self.cascade_limit = limit.max(1);
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn board(&self) -> &SharedBoard {
        self.locator.board()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a stage hook failed during [`initialize`](Self::initialize).
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Module ids in the order they were added (the init order).
    pub fn module_ids(&self) -> &[ModuleId] {
        &self.order
    }

    /// Every trace record so far.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Adds a module whose record already exists in the topology.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::UnknownModule`] if the id is not in the topology
    /// - [`ModuleError::DuplicateModule`] if the id was already added
    /// - [`ModuleError::LateModule`] once [`initialize`](Self::initialize)
    ///   has run or failed
    pub fn add_module(&mut self, module: Box<dyn Module>) -> ModuleResult<ModuleId> {
        let id = module.core().id();
        if self.initialized || self.failed {
            return Err(ModuleError::LateModule(id));
        }
        if !self.topology.is_live(id) {
            return Err(ModuleError::UnknownModule(id));
        }
        if self.modules.contains_key(&id) {
            return Err(ModuleError::DuplicateModule(id));
        }
        self.modules.insert(id, module);
        self.order.push(id);
        Ok(id)
    }

    /// Removes a module and its topology record at teardown.
    ///
    /// The module's subscriptions are dropped from the board.
    pub fn remove_module(&mut self, id: ModuleId) -> Option<Box<dyn Module>> {
        let module = self.modules.remove(&id)?;
        self.order.retain(|m| *m != id);
        self.topology.remove(id);
        self.locator.board().borrow_mut().unsubscribe_all(id);
        Some(module)
    }

    /// Typed access to a module.
    pub fn module<T: 'static>(&self, id: ModuleId) -> Option<&T> {
        self.modules
            .get(&id)
            .and_then(|m| m.as_any().downcast_ref::<T>())
    }

    /// Untyped access, e.g. to reach a module's [`ModuleCore`](crate::module::ModuleCore).
    pub fn module_dyn(&self, id: ModuleId) -> Option<&dyn Module> {
        self.modules.get(&id).map(|m| m.as_ref())
    }

    /// Runs every init stage over every module.
    ///
    /// Stage `s` is called on all modules (in insertion order) before stage
    /// `s + 1` starts on any of them. Delivery opens when the stage 0 sweep
    /// is complete. Publications made during a stage are fanned out once
    /// that stage has run on every module. A second call does nothing.
    ///
    /// # Errors
    ///
    /// [`ModuleError::TooFewStages`] before any stage runs, or the first
    /// error returned by a module's stage hook. After a hook error the
    /// failing module's subscriptions are dropped and every later call
    /// returns [`ModuleError::InitializationFailed`].
    pub fn initialize(&mut self) -> ModuleResult<()> {
        if self.failed {
            return Err(ModuleError::InitializationFailed);
        }
        if self.initialized {
            warn!("initialize called twice, ignoring");
            return Ok(());
        }
        let mut max_stages = MIN_INIT_STAGES;
        for id in &self.order {
            let Some(module) = self.modules.get(id) else {
                continue;
            };
            let declared = module.num_init_stages();
            if declared < MIN_INIT_STAGES {
                return Err(ModuleError::TooFewStages {
                    module: *id,
                    declared,
                    required: MIN_INIT_STAGES,
                });
            }
            max_stages = max_stages.max(declared);
        }

        for stage in 0..max_stages {
            if let Err(e) = self.sweep_stage(stage) {
                self.failed = true;
                warn!(stage, error = %e, "initialization failed");
                return Err(e);
            }
        }
        self.initialized = true;
        info!(
            modules = self.order.len(),
            stages = max_stages,
            "initialization complete"
        );
        Ok(())
    }

    /// Publishes from outside any module and returns the number of
    /// deliveries, including those of publications made by handlers.
    ///
    /// # Errors
    ///
    /// - [`BoardError::DeliveryNotOpen`](crate::error::BoardError::DeliveryNotOpen)
    ///   before stage 0 has completed
    /// - [`ModuleError::CascadeLimit`] when handler publications do not die
    ///   out within the cascade limit
    /// - [`ModuleError::InitializationFailed`] after a failed initialization
    pub fn publish<I: BbItem + 'static>(
        &mut self,
        category: Category,
        details: I,
        scope: Option<ModuleId>,
    ) -> ModuleResult<usize> {
        self.publish_shared(category, Rc::new(details), scope)
    }

    pub fn publish_shared(
        &mut self,
        category: Category,
        details: Rc<dyn BbItem>,
        scope: Option<ModuleId>,
    ) -> ModuleResult<usize> {
        if self.failed {
            return Err(ModuleError::InitializationFailed);
        }
        let mut queue = VecDeque::from([Publication {
            category,
            details,
            scope,
            origin: None,
        }]);
        self.fan_out(&mut queue)
    }

    /// Runs `stage` on every taking-part module, then fans out what they
    /// published.
    fn sweep_stage(&mut self, stage: u32) -> ModuleResult<()> {
        let mut queue = VecDeque::new();
        let ids = self.order.clone();
        for id in ids {
            let takes_part = self
                .modules
                .get(&id)
                .is_some_and(|m| m.num_init_stages() > stage);
            if takes_part {
                queue.extend(self.run_stage(id, stage)?);
            }
        }
        if stage == 0 {
            self.locator.board().borrow_mut().open_delivery();
            self.record(None, TraceKind::DeliveryOpened);
            debug!(modules = self.order.len(), "stage 0 complete, delivery open");
        }
        self.fan_out(&mut queue)?;
        Ok(())
    }

    fn run_stage(&mut self, id: ModuleId, stage: u32) -> ModuleResult<Vec<Publication>> {
        let Some(mut module) = self.modules.remove(&id) else {
            return Ok(Vec::new());
        };
        let result = stage_call(module.as_mut(), stage, &self.topology, &self.locator);
        self.modules.insert(id, module);
        let effects = match result {
            Ok(effects) => effects,
            Err(e) => {
                self.locator.board().borrow_mut().unsubscribe_all(id);
                return Err(e);
            }
        };

        for category in effects.subscriptions {
            self.record(Some(id), TraceKind::Subscribed { category });
        }
        self.record(Some(id), TraceKind::StageCompleted { stage });
        Ok(effects.publications)
    }

    fn fan_out(&mut self, queue: &mut VecDeque<Publication>) -> ModuleResult<usize> {
        let board = self.locator.board().clone();
        let mut delivered = 0;
        let mut published = 0;
        while let Some(publication) = queue.pop_front() {
            published += 1;
            if published > self.cascade_limit {
                let limit = self.cascade_limit;
                queue.clear();
                warn!(category = %publication.category, limit, "publication cascade cut off");
                return Err(ModuleError::CascadeLimit {
                    category: publication.category,
                    limit,
                });
            }
            let Publication {
                category,
                details,
                scope,
                origin,
            } = publication;
            let receivers = board.borrow_mut().begin_publish(category)?;
            self.record(
                origin,
                TraceKind::Published {
                    category,
                    scope,
                    receivers: receivers.len(),
                },
            );

            for receiver in receivers {
                let Some(mut module) = self.modules.remove(&receiver) else {
                    continue;
                };
                self.record(Some(receiver), TraceKind::Delivered { category, scope });
                let mut effects = Effects::default();
                {
                    let mut ctx = NotifyContext::new(receiver, &self.topology, &board, &mut effects);
                    module.receive_bb_item(&mut ctx, category, &*details, scope);
                }
                self.modules.insert(receiver, module);
                delivered += 1;
                queue.extend(effects.publications);
            }
        }
        Ok(delivered)
    }

    fn record(&mut self, module: Option<ModuleId>, kind: TraceKind) {
        self.trace.push(TraceEntry {
            seq: self.next_seq,
            module,
            kind,
        });
        self.next_seq += 1;
    }
}

fn stage_call(
    module: &mut dyn Module,
    stage: u32,
    topology: &Topology,
    locator: &ServiceLocator,
) -> ModuleResult<Effects> {
    let id = module.core().id();
    module.core_mut().enter_stage(stage, topology, locator)?;
    let mut effects = Effects::default();
    let mut ctx = InitContext::new(id, stage, topology, locator.board(), &mut effects);
    module.initialize(&mut ctx, stage)?;
    module.core_mut().complete_stage(stage);
    Ok(effects)
}
