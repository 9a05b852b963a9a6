//! Startup, the main loop and guarded teardown.
//!
//! [`run`] is the only entry into the kiosk. Whatever ends the loop (a stop
//! request, an error, a panic or an interrupt) teardown runs before `run`
//! returns, and a requested power action is executed only after the
//! hardware has been released.

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::actions::PowerAction;
use crate::composer::Screen;
use crate::context::Context;
use crate::drivers::{Devices, PowerControl};
use crate::registry::ModuleRegistry;
use crate::scheduler::{Scheduler, StopReason};

/// Run the kiosk on `devices` until it stops, then tear down and carry out
/// any power action. Returns why the kiosk stopped.
pub fn run(ctx: &Context, devices: &mut Devices, interrupt: &AtomicBool) -> StopReason {
    let ctx = ctx.scoped("kleine::lifecycle");
    let mut screen = Screen::new(devices.display.screen_size());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| start_and_loop(&ctx, devices, &mut screen, interrupt)));
    let reason = match outcome {
        Ok(reason) => reason,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!(target: ctx.target(), "main loop panicked: {}", message);
            StopReason::Failed(format!("panic: {}", message))
        }
    };

    teardown(&ctx, devices, &mut screen);

    if let StopReason::Power(action) = reason {
        execute_power_action(&ctx, devices.power.as_mut(), action);
    }
    reason
}

fn start_and_loop(ctx: &Context, devices: &mut Devices, screen: &mut Screen, interrupt: &AtomicBool) -> StopReason {
    let config = ctx.config();
    let target = ctx.target();

    if let Err(err) = devices.storage.remove_previous_artifacts(&config.mocked_artifact_dirs()) {
        log::warn!(target: target, "could not clean previous output: {}", err);
    }

    if let Err(err) = screen.render_splash(devices.display.as_mut(), &config.app.name, &config.mock_status()) {
        log::error!(target: target, "splash failed: {}", err);
        return StopReason::Failed(err.to_string());
    }
    thread::sleep(config.ui.splash());
    if interrupt.load(Ordering::Relaxed) {
        return StopReason::Interrupted;
    }

    let registry = ModuleRegistry::from_config(&config.modules);
    match Scheduler::new(ctx, devices, screen, registry) {
        Ok(mut scheduler) => scheduler.run(interrupt),
        Err(err) => {
            log::error!(target: target, "cannot start: {}", err);
            StopReason::Failed(err.to_string())
        }
    }
}

/// Release every device. Each step runs even when an earlier one failed or
/// panicked; failures are logged and go no further.
pub fn teardown(ctx: &Context, devices: &mut Devices, screen: &mut Screen) {
    let target = ctx.target();
    log::info!(target: target, "shutting down");

    guarded(target, "blank frame", || screen.render_blank(devices.display.as_mut()));
    guarded(target, "display close", || devices.display.close());
    guarded(target, "input close", || devices.input.close());
    guarded(target, "battery close", || devices.sensors.battery.close());
    guarded(target, "gps close", || devices.sensors.position.close());
}

fn guarded<E: Display>(target: &str, what: &str, step: impl FnOnce() -> Result<(), E>) {
    match panic::catch_unwind(AssertUnwindSafe(step)) {
        Ok(Ok(())) => log::debug!(target: target, "{} done", what),
        Ok(Err(err)) => log::warn!(target: target, "{} failed: {}", what, err),
        Err(payload) => log::warn!(target: target, "{} panicked: {}", what, panic_message(payload.as_ref())),
    }
}

fn execute_power_action(ctx: &Context, power: &mut dyn PowerControl, action: PowerAction) {
    let target = ctx.target();
    log::info!(target: target, "power action: {:?}", action);
    let result = match action {
        PowerAction::Shutdown => power.shutdown(),
        PowerAction::Reboot => power.reboot(),
        PowerAction::Restart => power.restart(),
    };
    if let Err(err) = result {
        log::error!(target: target, "{:?} failed: {}", action, err);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("sensor bus stuck")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "sensor bus stuck");
        let payload = panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
