//! Option actions.
//!
//! `enter` on a selected option lands here. Actions never fail the loop: a
//! problem becomes a modal message. Power actions that end the process are
//! returned as a stop so teardown runs before the OS call is made.

use crate::context::Context;
use crate::drivers::PowerControl;
use crate::registry::{ModuleId, OptionId};
use crate::scheduler::StopReason;

/// OS-level action executed after teardown.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowerAction {
    Shutdown,
    Reboot,
    /// Re-execute the program after a successful update.
    Restart,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ActionOutcome {
    /// Text for the modal. Empty means nothing to show.
    Message(String),
    /// Blank the screen until the next button press.
    Sleep,
    Stop(StopReason),
}

pub struct ActionHandler {
    ctx: Context,
}

impl ActionHandler {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Power actions are only simulated while the UPS is mocked, so a
    /// desktop run never shuts down its host.
    fn power_mocked(&self) -> bool {
        self.ctx.config().ups.mock
    }

    pub fn activate(&mut self, module: &ModuleId, option: &OptionId, power: &mut dyn PowerControl) -> ActionOutcome {
        let target = self.ctx.target();
        log::info!(target: target, "{} -> {}", module, option);

        let stop = |action| ActionOutcome::Stop(StopReason::Power(action));
        match (module, option) {
            (ModuleId::Power, OptionId::Sleep) => ActionOutcome::Sleep,
            (ModuleId::Power, OptionId::Shutdown) if self.power_mocked() => mocked("Shutdown"),
            (ModuleId::Power, OptionId::Shutdown) => stop(PowerAction::Shutdown),
            (ModuleId::Power, OptionId::Reboot) if self.power_mocked() => mocked("Reboot"),
            (ModuleId::Power, OptionId::Reboot) => stop(PowerAction::Reboot),
            (ModuleId::Power, OptionId::UpdateRestart) if self.power_mocked() => mocked("Update"),
            (ModuleId::Power, OptionId::UpdateRestart) => {
                if power.self_update_and_restart() {
                    stop(PowerAction::Restart)
                } else {
                    ActionOutcome::Message("Update failed".to_string())
                }
            }
            (module, option) => {
                log::warn!(target: target, "option {:?} has no action in module {}", option.label(), module);
                ActionOutcome::Message(format!("{} is not available", option.label()))
            }
        }
    }
}

fn mocked(what: &str) -> ActionOutcome {
    ActionOutcome::Message(format!("{} is mocked", what))
}
