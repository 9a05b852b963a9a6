//! The cooperative main loop.
//!
//! One [`Scheduler::step`] is one loop iteration:
//!
//! 1. Every-minute cadence: poll the environment sensors, battery, WiFi and
//!    the network details.
//! 2. Every-N-seconds cadence, while GPS or cockpit is active: poll position.
//!    Entering such a module polls right away.
//! 3. Real-time cadence, while the accelerometer is active: poll motion.
//! 4. Buttons: `menu` cycles modules, `select` cycles options, `enter`
//!    triggers the selected option.
//! 5. Render one frame if anything above asked for it.
//!
//! Pending redraws are collected in a single flag, so an iteration renders
//! at most one regular frame. Sensor failures are logged and keep the stale
//! value; only display failures end the loop with an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::actions::{ActionHandler, ActionOutcome, PowerAction};
use crate::cadence::{ClockReading, MinuteCadence, SecondsCadence};
use crate::composer::{FrameParams, FrameSummary, Screen};
use crate::config::StatusBarConfig;
use crate::context::Context;
use crate::drivers::{Button, Devices};
use crate::error::{ConfigError, Error, SensorError};
use crate::registry::{ModuleId, ModuleRegistry, OptionId};
use crate::state::{GatheredState, ModalMessage, NavigationState};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StopReason {
    /// SIGINT, SIGTERM or the simulator window was closed.
    Interrupted,
    /// Run this power action once the hardware is released.
    Power(PowerAction),
    Failed(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Continue,
    Stop(StopReason),
}

pub struct Scheduler<'a> {
    ctx: Context,
    devices: &'a mut Devices,
    screen: &'a mut Screen,
    registry: ModuleRegistry,
    actions: ActionHandler,
    navigation: NavigationState,
    state: GatheredState,
    modal: Option<ModalMessage>,
    minute: MinuteCadence,
    seconds: SecondsCadence,
    position_active: bool,
    now: ClockReading,
    clear_modal_pending: bool,
    sleeping: bool,
    last_frame: Option<FrameSummary>,
}

/// The polled value, or `None` after logging the failure.
fn polled<T>(target: &str, what: &str, result: Result<T, SensorError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(SensorError::Unavailable(name)) => {
            log::trace!(target: target, "{} skipped, {} unavailable", what, name);
            None
        }
        Err(err) => {
            log::warn!(target: target, "{} poll failed: {}", what, err);
            None
        }
    }
}

impl<'a> Scheduler<'a> {
    pub fn new(ctx: &Context, devices: &'a mut Devices, screen: &'a mut Screen, registry: ModuleRegistry) -> Result<Self, Error> {
        if registry.is_empty() {
            return Err(ConfigError::Invalid("no modules to show".into()).into());
        }
        let ctx = ctx.scoped("kleine::scheduler");
        Ok(Self {
            seconds: SecondsCadence::new(ctx.config().cadence.seconds_interval),
            actions: ActionHandler::new(ctx.scoped("kleine::actions")),
            ctx,
            devices,
            screen,
            registry,
            navigation: NavigationState::new(),
            state: GatheredState::default(),
            modal: None,
            minute: MinuteCadence::new(),
            position_active: false,
            now: ClockReading::default(),
            clear_modal_pending: false,
            sleeping: false,
            last_frame: None,
        })
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    pub fn state(&self) -> &GatheredState {
        &self.state
    }

    /// Summary of the most recently rendered frame.
    pub fn last_frame(&self) -> Option<&FrameSummary> {
        self.last_frame.as_ref()
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    fn current_module(&self) -> Option<&ModuleId> {
        self.navigation.selected_module().and_then(|index| self.registry.module(index))
    }

    /// Loop until a step stops or `interrupt` is raised.
    pub fn run(&mut self, interrupt: &AtomicBool) -> StopReason {
        let target = self.ctx.target();
        let tick = self.ctx.config().ui.tick();
        loop {
            if interrupt.load(Ordering::Relaxed) {
                log::info!(target: target, "interrupted");
                return StopReason::Interrupted;
            }
            match self.step() {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::Stop(reason)) => {
                    log::info!(target: target, "stopping: {:?}", reason);
                    return reason;
                }
                Err(err) => {
                    log::error!(target: target, "main loop failed: {}", err);
                    return StopReason::Failed(err.to_string());
                }
            }
            thread::sleep(tick);
        }
    }

    /// One loop iteration.
    pub fn step(&mut self) -> Result<StepOutcome, Error> {
        self.now = self.devices.clock.now();
        let mut refresh = self.navigation.is_uninitialized() || std::mem::take(&mut self.clear_modal_pending);

        if self.minute.check(&self.now) {
            let changed = self.poll_every_minute();
            refresh |= changed || self.ctx.config().statusbar.show_time;
        }
        let position_active = self.current_module().is_some_and(ModuleId::uses_position);
        if position_active && !self.position_active {
            self.seconds.reset();
        }
        self.position_active = position_active;
        if position_active && self.seconds.check(self.now.second) {
            refresh |= self.poll_position();
        }
        if self.current_module().is_some_and(ModuleId::uses_motion) {
            refresh |= self.poll_motion();
        }

        if self.sleeping {
            if self.wake_pressed() {
                log::info!(target: self.ctx.target(), "waking up");
                self.sleeping = false;
                self.debounce();
                refresh = true;
            }
        } else {
            refresh |= self.handle_navigation();
            match self.handle_enter()? {
                Some(StepOutcome::Stop(reason)) => return Ok(StepOutcome::Stop(reason)),
                Some(StepOutcome::Continue) => refresh = true,
                None => {}
            }
        }

        if refresh {
            self.render()?;
        }
        Ok(StepOutcome::Continue)
    }

    // =========================================================================
    // Cadences
    // =========================================================================

    fn poll_every_minute(&mut self) -> bool {
        let target = self.ctx.target();
        let sensors = &mut self.devices.sensors;
        let state = &mut self.state;
        let mut changed = false;

        if let Some(value) = polled(target, "temperature", sensors.poll_temperature()) {
            changed |= state.update_temperature(value);
        }
        if let Some(value) = polled(target, "humidity", sensors.poll_humidity()) {
            changed |= state.update_humidity(value);
        }
        if let Some(value) = polled(target, "air pressure", sensors.poll_air_pressure()) {
            changed |= state.update_air_pressure(value);
        }
        if let Some(reading) = polled(target, "battery", sensors.poll_battery()) {
            changed |= state.update_battery(reading);
        }
        if let Some(quality) = polled(target, "wifi", sensors.poll_wireless()) {
            changed |= state.update_wifi(quality);
        }
        if let Some(info) = polled(target, "network", sensors.poll_network()) {
            changed |= state.update_network(info);
        }
        log::debug!(target: target, "minute poll, changed={}", changed);
        changed
    }

    fn poll_position(&mut self) -> bool {
        let target = self.ctx.target();
        polled(target, "position", self.devices.sensors.poll_position()).is_some_and(|fix| self.state.update_gps(fix))
    }

    fn poll_motion(&mut self) -> bool {
        let target = self.ctx.target();
        polled(target, "orientation", self.devices.sensors.poll_orientation())
            .is_some_and(|orientation| self.state.update_orientation(orientation))
    }

    // =========================================================================
    // Buttons
    // =========================================================================

    fn pressed(&mut self, button: Button) -> bool {
        self.devices.input.is_pressed(button.as_str())
    }

    fn debounce(&self) {
        thread::sleep(self.ctx.config().input.debounce());
    }

    /// Any button, with every press consumed.
    fn wake_pressed(&mut self) -> bool {
        Button::ALL.into_iter().fold(false, |any, button| self.pressed(button) | any)
    }

    /// Module and option selection. Returns whether a redraw is needed.
    fn handle_navigation(&mut self) -> bool {
        let mut changed = false;

        if self.navigation.is_uninitialized() || self.pressed(Button::Menu) {
            let index = self.navigation.next_module(self.registry.len());
            log::debug!(
                target: self.ctx.target(),
                "module {} ({})",
                index,
                self.registry.module(index).map_or("?", ModuleId::name)
            );
            self.debounce();
            changed = true;
        }

        if self.pressed(Button::Select) {
            let count = self.navigation.selected_module().map_or(0, |index| self.registry.options(index).len());
            if self.navigation.next_option(count) {
                self.debounce();
                changed = true;
            }
        }
        changed
    }

    /// `enter` on the selected option. `Some(Continue)` asks for a redraw.
    fn handle_enter(&mut self) -> Result<Option<StepOutcome>, Error> {
        if !self.pressed(Button::Enter) {
            return Ok(None);
        }
        let (Some(module_index), Some(option_index)) = (self.navigation.selected_module(), self.navigation.selected_option())
        else {
            return Ok(None);
        };
        let (Some(module), Some(option)) = (
            self.registry.module(module_index).cloned(),
            self.registry.options(module_index).get(option_index).cloned(),
        ) else {
            return Ok(None);
        };

        self.render_please_wait(&module, &option)?;
        let outcome = self.actions.activate(&module, &option, self.devices.power.as_mut());
        Ok(match outcome {
            ActionOutcome::Message(text) if text.trim().is_empty() => Some(StepOutcome::Continue),
            ActionOutcome::Message(text) => {
                self.modal = Some(ModalMessage::new(text, true));
                Some(StepOutcome::Continue)
            }
            ActionOutcome::Sleep => {
                log::info!(target: self.ctx.target(), "screen asleep");
                self.sleeping = true;
                Some(StepOutcome::Continue)
            }
            ActionOutcome::Stop(reason) => Some(StepOutcome::Stop(reason)),
        })
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render_please_wait(&mut self, module: &ModuleId, option: &OptionId) -> Result<(), Error> {
        let wait = ModalMessage::new(self.ctx.config().ui.please_wait.clone(), false);
        let index = self.navigation.selected_module().unwrap_or(0);
        let params = FrameParams {
            module,
            options: self.registry.options(index),
            selected_option: self.navigation.selected_option(),
            state: &self.state,
            statusbar: self.ctx.config().statusbar,
            clock: (self.now.hour, self.now.minute),
            modal: Some(&wait),
            blank: false,
        };
        log::debug!(target: self.ctx.target(), "running {} / {}", module, option);
        let summary = self.screen.render(self.devices.display.as_mut(), &params)?;
        self.last_frame = Some(summary);
        Ok(())
    }

    fn render(&mut self) -> Result<(), Error> {
        let index = self.navigation.selected_module().unwrap_or(0);
        let Some(module) = self.registry.module(index) else {
            return Err(ConfigError::Invalid(format!("module index {} out of range", index)).into());
        };

        let statusbar = if self.sleeping {
            StatusBarConfig::disabled()
        } else {
            self.ctx.config().statusbar
        };
        let params = FrameParams {
            module,
            options: self.registry.options(index),
            selected_option: self.navigation.selected_option(),
            state: &self.state,
            statusbar,
            clock: (self.now.hour, self.now.minute),
            modal: self.modal.as_ref(),
            blank: self.sleeping,
        };
        let summary = self.screen.render(self.devices.display.as_mut(), &params)?;

        // A modal is consumed by the frame that shows it. With `wait`, it
        // stays up for the dwell and the next iteration redraws without it.
        if let Some(modal) = self.modal.take()
            && modal.wait
            && summary.modal_shown
        {
            thread::sleep(self.ctx.config().ui.modal_dwell());
            self.clear_modal_pending = true;
        }
        self.last_frame = Some(summary);
        Ok(())
    }
}
