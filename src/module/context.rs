//! Contexts handed to modules during initialization and notification.

use std::rc::Rc;

use crate::error::BoardError;
use crate::notify::{BbItem, Category, SharedBoard};
use crate::topology::{self, ModuleId, Topology};

/// A publication waiting to be fanned out.
#[derive(Debug, Clone)]
pub struct Publication {
    pub category: Category,
    pub details: Rc<dyn BbItem>,
    pub scope: Option<ModuleId>,
    /// Module that published, `None` for external publishers.
    pub origin: Option<ModuleId>,
}

/// Side effects a module requested during one call.
///
/// Collected while the module is borrowed and applied by the runtime once
/// the call has returned.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub(crate) subscriptions: Vec<Category>,
    pub(crate) publications: Vec<Publication>,
}

fn queue_publication(
    board: &SharedBoard,
    effects: &mut Effects,
    origin: ModuleId,
    category: Category,
    details: Rc<dyn BbItem>,
    scope: Option<ModuleId>,
) -> Result<(), BoardError> {
    if !board.borrow().is_delivering() {
        return Err(BoardError::DeliveryNotOpen { category });
    }
    effects.publications.push(Publication {
        category,
        details,
        scope,
        origin: Some(origin),
    });
    Ok(())
}

// ── InitContext ───────────────────────────────────────────────────────

/// Context passed to [`Module::initialize`](super::Module::initialize).
pub struct InitContext<'a> {
    module: ModuleId,
    stage: u32,
    topology: &'a Topology,
    board: &'a SharedBoard,
    effects: &'a mut Effects,
}

impl<'a> InitContext<'a> {
    pub(crate) fn new(
        module: ModuleId,
        stage: u32,
        topology: &'a Topology,
        board: &'a SharedBoard,
        effects: &'a mut Effects,
    ) -> Self {
        Self {
            module,
            stage,
            topology,
            board,
            effects,
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn topology(&self) -> &Topology {
        self.topology
    }

    pub fn log_name(&self) -> String {
        topology::log_name(self.topology, self.module)
    }

    /// Category registered under `name` on the board.
    pub fn category(&mut self, name: &str) -> Category {
        self.board.borrow_mut().category(name)
    }

    /// Subscribes the module to `category`.
    ///
    /// # Errors
    ///
    /// [`BoardError::SubscriptionClosed`] outside stage 0.
    pub fn subscribe(&mut self, category: Category) -> Result<(), BoardError> {
        if self.stage != 0 {
            return Err(BoardError::SubscriptionClosed {
                module: self.module,
                category,
            });
        }
        if self.board.borrow_mut().subscribe(category, self.module)? {
            self.effects.subscriptions.push(category);
        }
        Ok(())
    }

    /// Publishes a change, delivered once this stage call returns.
    ///
    /// # Errors
    ///
    /// [`BoardError::DeliveryNotOpen`] during stage 0.
    pub fn publish<I: BbItem + 'static>(
        &mut self,
        category: Category,
        details: I,
        scope: Option<ModuleId>,
    ) -> Result<(), BoardError> {
        queue_publication(
            self.board,
            self.effects,
            self.module,
            category,
            Rc::new(details),
            scope,
        )
    }
}

// ── NotifyContext ─────────────────────────────────────────────────────

/// Context passed to
/// [`NotificationReceiver::receive_bb_item`](crate::notify::NotificationReceiver::receive_bb_item).
pub struct NotifyContext<'a> {
    module: ModuleId,
    topology: &'a Topology,
    board: &'a SharedBoard,
    effects: &'a mut Effects,
}

impl<'a> NotifyContext<'a> {
    pub(crate) fn new(
        module: ModuleId,
        topology: &'a Topology,
        board: &'a SharedBoard,
        effects: &'a mut Effects,
    ) -> Self {
        Self {
            module,
            topology,
            board,
            effects,
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn topology(&self) -> &Topology {
        self.topology
    }

    pub fn log_name(&self) -> String {
        topology::log_name(self.topology, self.module)
    }

    /// Looks up a category by name without allocating a new one.
    pub fn category_named(&self, name: &str) -> Option<Category> {
        self.board.borrow().category_named(name)
    }

    /// Queues a publication; it is delivered after the current fan-out.
    pub fn publish<I: BbItem + 'static>(
        &mut self,
        category: Category,
        details: I,
        scope: Option<ModuleId>,
    ) -> Result<(), BoardError> {
        queue_publication(
            self.board,
            self.effects,
            self.module,
            category,
            Rc::new(details),
            scope,
        )
    }
}
