//! Blackboard: publish/subscribe registry shared by all modules.
//!
//! The board only records who listens to what and whether delivery is open.
//! Fan-out to the receivers is done by the runtime that owns the modules,
//! using the snapshot returned by [`Blackboard::begin_publish`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::BoardError;
use crate::topology::ModuleId;

use super::category::Category;

/// Shared handle to the board.
pub type SharedBoard = Rc<RefCell<Blackboard>>;

/// Phase of the board within the initialization protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    /// Stage 0: subscriptions accepted, no deliveries.
    Subscribing,
    /// Stage 1 onwards: deliveries allowed, subscriptions closed.
    Delivering,
}

#[derive(Debug, Clone)]
pub struct Blackboard {
    phase: BoardPhase,
    registry: BTreeMap<String, Category>,
    next_category: u32,
    subscriptions: BTreeMap<Category, Vec<ModuleId>>,
    publications: u64,
}

impl Default for Blackboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Blackboard {
    pub fn new() -> Self {
        Self {
            phase: BoardPhase::Subscribing,
            registry: BTreeMap::new(),
            next_category: 0,
            subscriptions: BTreeMap::new(),
            publications: 0,
        }
    }

    /// Wraps a fresh board in a shared handle.
    pub fn shared() -> SharedBoard {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Returns the category registered under `name`, allocating the next
    /// free id on first use.
    pub fn category(&mut self, name: &str) -> Category {
        if let Some(&cat) = self.registry.get(name) {
            return cat;
        }
        let cat = Category::new(self.next_category);
        self.next_category += 1;
        self.registry.insert(name.to_string(), cat);
        cat
    }

    /// Looks up a category without allocating.
    pub fn category_named(&self, name: &str) -> Option<Category> {
        self.registry.get(name).copied()
    }

    /// Registers `module` for `category`. Repeated calls are idempotent;
    /// returns `false` when the subscription already existed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::SubscriptionClosed`] once delivery has opened.
    pub fn subscribe(&mut self, category: Category, module: ModuleId) -> Result<bool, BoardError> {
        if self.phase != BoardPhase::Subscribing {
            return Err(BoardError::SubscriptionClosed { module, category });
        }
        let subs = self.subscriptions.entry(category).or_default();
        if subs.contains(&module) {
            return Ok(false);
        }
        subs.push(module);
        debug!(%module, %category, "subscribed");
        Ok(true)
    }

    /// Drops a subscription. Returns whether one existed.
    pub fn unsubscribe(&mut self, category: Category, module: ModuleId) -> bool {
        let Some(subs) = self.subscriptions.get_mut(&category) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|m| *m != module);
        before != subs.len()
    }

    /// Drops every subscription of `module`. Returns how many were removed.
    pub fn unsubscribe_all(&mut self, module: ModuleId) -> usize {
        let mut removed = 0;
        for subs in self.subscriptions.values_mut() {
            let before = subs.len();
            subs.retain(|m| *m != module);
            removed += before - subs.len();
        }
        removed
    }

    /// Subscribers of `category` in subscription order.
    pub fn subscribers(&self, category: Category) -> &[ModuleId] {
        self.subscriptions
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn subscriber_count(&self, category: Category) -> usize {
        self.subscribers(category).len()
    }

    pub fn is_subscribed(&self, category: Category, module: ModuleId) -> bool {
        self.subscribers(category).contains(&module)
    }

    /// Closes subscriptions and opens delivery. Called once every module
    /// has completed stage 0.
    pub fn open_delivery(&mut self) {
        self.phase = BoardPhase::Delivering;
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn is_delivering(&self) -> bool {
        self.phase == BoardPhase::Delivering
    }

    /// Starts a publication and returns the receivers to notify.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::DeliveryNotOpen`] before [`open_delivery`](Self::open_delivery).
    pub fn begin_publish(&mut self, category: Category) -> Result<Vec<ModuleId>, BoardError> {
        if !self.is_delivering() {
            return Err(BoardError::DeliveryNotOpen { category });
        }
        self.publications += 1;
        Ok(self.subscribers(category).to_vec())
    }

    /// Number of publications accepted so far.
    pub fn publications(&self) -> u64 {
        self.publications
    }
}
