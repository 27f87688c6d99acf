//! Service locator consulted by modules during stage 0.

use std::collections::BTreeMap;

use crate::battery::SharedBattery;
use crate::notify::{Blackboard, SharedBoard};
use crate::topology::ModuleId;

/// Shared services available to the modules of one simulation: the board
/// (the host utility) and the battery attached to each host.
#[derive(Clone)]
pub struct ServiceLocator {
    board: SharedBoard,
    batteries: BTreeMap<ModuleId, SharedBattery>,
}

impl Default for ServiceLocator {
    fn default() -> Self {
        Self::new(Blackboard::shared())
    }
}

impl std::fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("board", &self.board)
            .field("battery_hosts", &self.batteries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ServiceLocator {
    pub fn new(board: SharedBoard) -> Self {
        Self {
            board,
            batteries: BTreeMap::new(),
        }
    }

    /// Attaches `battery` to `host`, replacing any previous one.
    pub fn attach_battery(&mut self, host: ModuleId, battery: SharedBattery) {
        self.batteries.insert(host, battery);
    }

    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    /// Handle to the utility (the board) for a module.
    pub fn utility(&self) -> SharedBoard {
        self.board.clone()
    }

    /// Battery of `host`, if one is attached.
    pub fn battery_for(&self, host: ModuleId) -> Option<SharedBattery> {
        self.batteries.get(&host).cloned()
    }
}
