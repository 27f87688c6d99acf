//! A radio that reports its state on the board and books its current draw.

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{ModuleResult, RegistrationError};
use crate::module::{InitContext, Module, ModuleCore, NotifyContext};
use crate::notify::{BbItem, BbValue, Category, NotificationReceiver};
use crate::topology::ModuleId;

/// Board category carrying radio state changes.
pub const RADIO_STATE_CATEGORY: &str = "radio-state";

/// Operating state of the radio. Each state has its own battery account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadioState {
    #[default]
    Sleep,
    Rx,
    Tx,
}

impl RadioState {
    /// Number of states, hence of battery accounts.
    pub const COUNT: usize = 3;

    /// Sleep current (A).
    pub const SLEEP_CURRENT_A: f64 = 0.00002;
    /// Receive current (A).
    pub const RX_CURRENT_A: f64 = 0.0197;
    /// Transmit current (A).
    pub const TX_CURRENT_A: f64 = 0.0174;

    /// Battery account used while in this state.
    pub fn activity(self) -> usize {
        match self {
            RadioState::Sleep => 0,
            RadioState::Rx => 1,
            RadioState::Tx => 2,
        }
    }

    pub fn current_a(self) -> f64 {
        match self {
            RadioState::Sleep => Self::SLEEP_CURRENT_A,
            RadioState::Rx => Self::RX_CURRENT_A,
            RadioState::Tx => Self::TX_CURRENT_A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RadioState::Sleep => "sleep",
            RadioState::Rx => "rx",
            RadioState::Tx => "tx",
        }
    }
}

impl FromStr for RadioState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sleep" => Ok(RadioState::Sleep),
            "rx" => Ok(RadioState::Rx),
            "tx" => Ok(RadioState::Tx),
            other => Err(format!(
                "unknown radio state \"{other}\", expected sleep, rx or tx"
            )),
        }
    }
}

impl fmt::Display for RadioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radio module.
///
/// Subscribes to [`RADIO_STATE_CATEGORY`] in stage 0 and registers one
/// battery account per [`RadioState`]. In stage 1 it books the current of
/// its initial state and announces that state, scoped to its host.
/// Afterwards every radio-state notification scoped to its host switches
/// the radio: the old account drops to zero and the new one takes the
/// state's current.
#[derive(Debug)]
pub struct RadioModule {
    core: ModuleCore,
    name: String,
    state: RadioState,
    category: Option<Category>,
    transitions: usize,
    ignored: usize,
}

impl RadioModule {
    pub fn new(core: ModuleCore, name: impl Into<String>) -> Self {
        Self {
            core,
            name: name.into(),
            state: RadioState::default(),
            category: None,
            transitions: 0,
            ignored: 0,
        }
    }

    /// Starts the radio in `state` instead of [`RadioState::Sleep`].
    pub fn with_state(mut self, state: RadioState) -> Self {
        self.state = state;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RadioState {
        self.state
    }

    /// State changes applied from notifications.
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// Notifications dropped because their payload was not a radio state.
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    fn book(&self, state: RadioState, amount: f64) {
        if self.core.battery().accounts().is_none() {
            return;
        }
        if let Err(e) = self.core.drain_current(amount, state.activity()) {
            warn!(module = %self.name, error = %e, "drain rejected");
        }
    }
}

impl NotificationReceiver for RadioModule {
    fn receive_bb_item(
        &mut self,
        ctx: &mut NotifyContext<'_>,
        category: Category,
        details: &dyn BbItem,
        scope: Option<ModuleId>,
    ) {
        if Some(category) != self.category || scope != self.core.host() {
            return;
        }
        let next = details
            .downcast_ref::<BbValue>()
            .and_then(BbValue::as_text)
            .map(str::parse::<RadioState>);
        let next = match next {
            Some(Ok(state)) => state,
            Some(Err(e)) => {
                warn!(module = %ctx.log_name(), error = %e, "ignoring radio state");
                self.ignored += 1;
                return;
            }
            None => {
                warn!(
                    module = %ctx.log_name(),
                    payload = details.class_name(),
                    "radio state payload is not text"
                );
                self.ignored += 1;
                return;
            }
        };
        if next == self.state {
            return;
        }
        let previous = self.state;
        self.book(previous, 0.0);
        self.book(next, next.current_a());
        self.state = next;
        self.transitions += 1;
        if self.core.debug() {
            debug!(module = %ctx.log_name(), from = %previous, to = %next, "radio switched");
        }
    }
}

impl Module for RadioModule {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>, stage: u32) -> ModuleResult<()> {
        match stage {
            0 => {
                let category = ctx.category(RADIO_STATE_CATEGORY);
                ctx.subscribe(category)?;
                self.category = Some(category);
                match self
                    .core
                    .register_with_battery(&self.name, RadioState::COUNT as i32)
                {
                    Ok(_) | Err(RegistrationError::NoBattery) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            1 => {
                self.book(self.state, self.state.current_a());
                if let Some(category) = self.category {
                    ctx.publish(
                        category,
                        BbValue::Text(self.state.as_str().to_string()),
                        self.core.host(),
                    )?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_parse_and_display() {
        for state in [RadioState::Sleep, RadioState::Rx, RadioState::Tx] {
            assert_eq!(state.as_str().parse::<RadioState>(), Ok(state));
            assert_eq!(state.to_string(), state.as_str());
        }
        assert!("idle".parse::<RadioState>().is_err());
    }

    #[test]
    fn activities_cover_every_account() {
        let mut seen: Vec<usize> = [RadioState::Sleep, RadioState::Rx, RadioState::Tx]
            .iter()
            .map(|s| s.activity())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..RadioState::COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn new_radio_sleeps() {
        let radio = RadioModule::new(ModuleCore::new(ModuleId::new(1)), "nic");
        assert_eq!(radio.state(), RadioState::Sleep);
        assert_eq!(radio.transitions(), 0);
        assert_eq!(radio.name(), "nic");
    }
}
