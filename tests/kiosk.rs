//! End-to-end tests of the main loop on fake devices.
//!
//! Every fake appends to one shared event log, so tests can assert both
//! what happened and in which order (teardown before power actions).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use embedded_graphics::prelude::Size;
use kleine::cadence::{Clock, ClockReading};
use kleine::canvas::Canvas;
use kleine::composer::Screen;
use kleine::config::AppConfig;
use kleine::context::Context;
use kleine::drivers::sensors::MockBarometer;
use kleine::drivers::wireless::MockWireless;
use kleine::drivers::{
    BatteryGauge, Devices, DisplayDevice, InputAdapter, MotionSensor, PositionSensor, PowerControl, Sensors, Storage,
    Thermometer,
};
use kleine::error::{DisplayError, SensorError, StorageError};
use kleine::lifecycle;
use kleine::registry::ModuleRegistry;
use kleine::scheduler::{Scheduler, StepOutcome, StopReason};
use kleine::state::{BatteryReading, GpsReading, Orientation};
use kleine_common::{BatteryLevel, Icon};

type Events = Rc<RefCell<Vec<&'static str>>>;

// =============================================================================
// Fakes
// =============================================================================

struct RecordingDisplay {
    events: Events,
    fail_flush: bool,
    fail_close: bool,
}

impl DisplayDevice for RecordingDisplay {
    fn flush(&mut self, _canvas: &Canvas) -> Result<(), DisplayError> {
        self.events.borrow_mut().push("flush");
        if self.fail_flush {
            return Err(DisplayError::Io(io::Error::other("spi bus gone")));
        }
        Ok(())
    }

    fn screen_size(&self) -> Size {
        Size::new(320, 240)
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.events.borrow_mut().push("display.close");
        if self.fail_close {
            return Err(DisplayError::Closed);
        }
        Ok(())
    }
}

struct ScriptedInput {
    queue: Rc<RefCell<VecDeque<&'static str>>>,
    events: Events,
    fail_close: bool,
}

impl InputAdapter for ScriptedInput {
    fn is_pressed(&mut self, name: &str) -> bool {
        let mut queue = self.queue.borrow_mut();
        if queue.front() == Some(&name) {
            queue.pop_front();
            true
        } else {
            false
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.events.borrow_mut().push("input.close");
        if self.fail_close {
            return Err(io::Error::other("gpio busy"));
        }
        Ok(())
    }
}

struct FixedBattery {
    reading: Rc<Cell<BatteryReading>>,
    events: Events,
    fail_close: bool,
}

impl BatteryGauge for FixedBattery {
    fn poll_battery(&mut self) -> Result<BatteryReading, SensorError> {
        Ok(self.reading.get())
    }

    fn close(&mut self) -> Result<(), SensorError> {
        self.events.borrow_mut().push("battery.close");
        if self.fail_close {
            return Err(SensorError::Unavailable("ups"));
        }
        Ok(())
    }
}

struct NoFix {
    polls: Rc<Cell<usize>>,
    events: Events,
}

impl PositionSensor for NoFix {
    fn poll_position(&mut self) -> Result<Option<GpsReading>, SensorError> {
        self.polls.set(self.polls.get() + 1);
        Ok(None)
    }

    fn close(&mut self) -> Result<(), SensorError> {
        self.events.borrow_mut().push("gps.close");
        Ok(())
    }
}

struct CountingMotion {
    polls: Rc<Cell<usize>>,
}

impl MotionSensor for CountingMotion {
    fn poll_orientation(&mut self) -> Result<Orientation, SensorError> {
        self.polls.set(self.polls.get() + 1);
        Ok(Orientation::default())
    }
}

struct FlakyThermometer {
    temperature: Rc<Cell<f32>>,
    failing: Rc<Cell<bool>>,
}

impl FlakyThermometer {
    fn read(&self, value: f32) -> Result<f32, SensorError> {
        if self.failing.get() {
            return Err(SensorError::Io(io::Error::other("i2c nak")));
        }
        Ok(value)
    }
}

impl Thermometer for FlakyThermometer {
    fn poll_temperature(&mut self) -> Result<f32, SensorError> {
        self.read(self.temperature.get())
    }

    fn poll_humidity(&mut self) -> Result<f32, SensorError> {
        self.read(60.0)
    }
}

struct RecordingPower {
    events: Events,
}

impl PowerControl for RecordingPower {
    fn shutdown(&mut self) -> io::Result<()> {
        self.events.borrow_mut().push("shutdown");
        Ok(())
    }

    fn reboot(&mut self) -> io::Result<()> {
        self.events.borrow_mut().push("reboot");
        Ok(())
    }

    fn self_update_and_restart(&mut self) -> bool {
        self.events.borrow_mut().push("update");
        true
    }

    fn restart(&mut self) -> io::Result<()> {
        self.events.borrow_mut().push("restart");
        Ok(())
    }
}

struct RecordingStorage {
    events: Events,
}

impl Storage for RecordingStorage {
    fn remove_previous_artifacts(&mut self, _paths: &[PathBuf]) -> Result<(), StorageError> {
        self.events.borrow_mut().push("storage.clean");
        Ok(())
    }
}

struct ManualClock(Rc<Cell<ClockReading>>);

impl Clock for ManualClock {
    fn now(&self) -> ClockReading {
        self.0.get()
    }
}

// =============================================================================
// Rig
// =============================================================================

#[derive(Default)]
struct Faults {
    flush: bool,
    closes: bool,
}

struct Rig {
    events: Events,
    presses: Rc<RefCell<VecDeque<&'static str>>>,
    clock: Rc<Cell<ClockReading>>,
    battery: Rc<Cell<BatteryReading>>,
    temperature: Rc<Cell<f32>>,
    thermometer_failing: Rc<Cell<bool>>,
    position_polls: Rc<Cell<usize>>,
    motion_polls: Rc<Cell<usize>>,
}

impl Rig {
    fn press(&self, name: &'static str) {
        self.presses.borrow_mut().push_back(name);
    }

    fn flushes(&self) -> usize {
        self.events.borrow().iter().filter(|e| **e == "flush").count()
    }

    fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    fn advance_minutes(&self, minutes: i64) {
        let mut now = self.clock.get();
        now.minute_stamp += minutes;
        now.minute = (now.minute + minutes as u32) % 60;
        self.clock.set(now);
    }

    fn set_second(&self, second: u32) {
        let mut now = self.clock.get();
        now.second = second;
        self.clock.set(now);
    }
}

fn test_config(ups_mock: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.ui.tick_ms = 0;
    config.ui.modal_dwell_ms = 0;
    config.ui.splash_ms = 0;
    config.input.debounce_ms = 0;
    config.ups.mock = ups_mock;
    config
}

fn rig(faults: Faults) -> (Devices, Rig) {
    let rig = Rig {
        events: Rc::default(),
        presses: Rc::default(),
        clock: Rc::new(Cell::new(ClockReading {
            minute_stamp: 29_000_000,
            hour: 12,
            minute: 34,
            second: 0,
        })),
        battery: Rc::new(Cell::new(BatteryReading {
            percentage: 85,
            charging: false,
        })),
        temperature: Rc::new(Cell::new(22.5)),
        thermometer_failing: Rc::default(),
        position_polls: Rc::default(),
        motion_polls: Rc::default(),
    };

    let devices = Devices {
        sensors: Sensors {
            thermometer: Box::new(FlakyThermometer {
                temperature: Rc::clone(&rig.temperature),
                failing: Rc::clone(&rig.thermometer_failing),
            }),
            barometer: Box::new(MockBarometer { pressure: 1013.2 }),
            motion: Box::new(CountingMotion {
                polls: Rc::clone(&rig.motion_polls),
            }),
            position: Box::new(NoFix {
                polls: Rc::clone(&rig.position_polls),
                events: Rc::clone(&rig.events),
            }),
            battery: Box::new(FixedBattery {
                reading: Rc::clone(&rig.battery),
                events: Rc::clone(&rig.events),
                fail_close: faults.closes,
            }),
            wireless: Box::new(MockWireless),
        },
        input: Box::new(ScriptedInput {
            queue: Rc::clone(&rig.presses),
            events: Rc::clone(&rig.events),
            fail_close: faults.closes,
        }),
        display: Box::new(RecordingDisplay {
            events: Rc::clone(&rig.events),
            fail_flush: faults.flush,
            fail_close: faults.closes,
        }),
        power: Box::new(RecordingPower {
            events: Rc::clone(&rig.events),
        }),
        storage: Box::new(RecordingStorage {
            events: Rc::clone(&rig.events),
        }),
        clock: Box::new(ManualClock(Rc::clone(&rig.clock))),
    };
    (devices, rig)
}

fn step(scheduler: &mut Scheduler<'_>) {
    assert_eq!(scheduler.step().unwrap(), StepOutcome::Continue);
}

/// Press `name`, then run one iteration.
fn press_and_step(scheduler: &mut Scheduler<'_>, rig: &Rig, name: &'static str) {
    rig.press(name);
    step(scheduler);
}

const POWER_INDEX: usize = 6;
const REBOOT_OPTION: usize = 2;

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_first_step_selects_first_module() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();

    step(&mut scheduler);
    assert_eq!(scheduler.navigation().selected_module(), Some(0));
    assert_eq!(scheduler.navigation().selected_option(), None);
    let frame = scheduler.last_frame().expect("first step renders");
    assert_eq!(frame.icon, Icon::Thermometer, "module 0 is temperature");
    assert!(frame.statusbar_drawn);
    assert_eq!(scheduler.state().temperature, Some(22.5), "minute cadence fired on the first step");
    assert_eq!(rig.flushes(), 1, "exactly one frame per iteration");

    step(&mut scheduler);
    assert_eq!(rig.flushes(), 1, "nothing changed, nothing drawn");
}

#[test]
fn test_menu_wraps_and_select_is_noop_without_options() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();
    step(&mut scheduler);

    press_and_step(&mut scheduler, &rig, "select");
    assert_eq!(scheduler.navigation().selected_option(), None, "temperature has no options");
    assert_eq!(rig.flushes(), 1, "a no-op select does not redraw");

    for _ in 0..POWER_INDEX {
        press_and_step(&mut scheduler, &rig, "menu");
    }
    assert_eq!(scheduler.last_frame().map(|f| f.icon), Some(Icon::Power));

    press_and_step(&mut scheduler, &rig, "select");
    assert_eq!(scheduler.navigation().selected_option(), Some(0));

    press_and_step(&mut scheduler, &rig, "menu");
    assert_eq!(scheduler.navigation().selected_module(), Some(0), "menu wraps to the first module");
    assert_eq!(scheduler.navigation().selected_option(), None, "module change resets the option");
}

#[test]
fn test_mocked_reboot_shows_modal_once_and_continues() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();

    step(&mut scheduler);
    for _ in 0..POWER_INDEX {
        press_and_step(&mut scheduler, &rig, "menu");
    }
    for _ in 0..=REBOOT_OPTION {
        press_and_step(&mut scheduler, &rig, "select");
    }
    assert_eq!(scheduler.navigation().selected_option(), Some(REBOOT_OPTION));

    let before = rig.flushes();
    press_and_step(&mut scheduler, &rig, "enter");
    assert_eq!(rig.flushes(), before + 2, "please-wait frame, then the message frame");
    assert!(scheduler.last_frame().unwrap().modal_shown);

    step(&mut scheduler);
    assert_eq!(rig.flushes(), before + 3, "one forced redraw clears the modal");
    assert!(!scheduler.last_frame().unwrap().modal_shown);

    step(&mut scheduler);
    assert_eq!(rig.flushes(), before + 3, "no third frame for the modal");
    assert_eq!(rig.count("reboot"), 0, "mocked UPS never reboots");
}

#[test]
fn test_minute_cadence_and_battery_classes() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();

    step(&mut scheduler);
    assert_eq!(scheduler.last_frame().unwrap().battery_level, Some(BatteryLevel::High));

    rig.battery.set(BatteryReading {
        percentage: 20,
        charging: false,
    });
    step(&mut scheduler);
    assert_eq!(rig.flushes(), 1, "battery is only polled on a new minute");

    rig.advance_minutes(1);
    step(&mut scheduler);
    assert_eq!(rig.flushes(), 2);
    assert_eq!(scheduler.last_frame().unwrap().battery_level, Some(BatteryLevel::Low));
    step(&mut scheduler);
    assert_eq!(rig.flushes(), 2, "one firing per minute");

    rig.battery.set(BatteryReading {
        percentage: 20,
        charging: true,
    });
    rig.advance_minutes(1);
    step(&mut scheduler);
    assert_eq!(scheduler.last_frame().unwrap().battery_level, Some(BatteryLevel::Charging));
}

#[test]
fn test_position_and_motion_follow_the_active_module() {
    let mut config = test_config(true);
    config.cadence.seconds_interval = 10;
    let ctx = Context::new(config);
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();
    let polls = || (rig.position_polls.get(), rig.motion_polls.get());

    step(&mut scheduler);
    step(&mut scheduler);
    assert_eq!(polls(), (0, 0), "temperature polls neither position nor motion");

    press_and_step(&mut scheduler, &rig, "menu");
    step(&mut scheduler);
    step(&mut scheduler);
    assert_eq!(polls(), (0, 2), "accelerometer polls motion every step");

    press_and_step(&mut scheduler, &rig, "menu");
    assert_eq!(polls(), (0, 3), "the step that leaves accelerometer still polls it");
    step(&mut scheduler);
    assert_eq!(polls(), (1, 3), "entering gps polls position right away");
    step(&mut scheduler);
    rig.set_second(9);
    step(&mut scheduler);
    assert_eq!(polls(), (1, 3), "not due before the interval");
    rig.set_second(10);
    step(&mut scheduler);
    step(&mut scheduler);
    assert_eq!(polls(), (2, 3), "one poll per interval");
}

#[test]
fn test_position_polls_on_reentry() {
    let mut config = test_config(true);
    config.cadence.seconds_interval = 10;
    let ctx = Context::new(config);
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();

    step(&mut scheduler);
    press_and_step(&mut scheduler, &rig, "menu");
    press_and_step(&mut scheduler, &rig, "menu");
    rig.set_second(10);
    step(&mut scheduler);
    assert_eq!(rig.position_polls.get(), 1, "gps entered at second 10");

    // gps -> cockpit -> info leaves the position modules at second 12.
    rig.set_second(12);
    press_and_step(&mut scheduler, &rig, "menu");
    press_and_step(&mut scheduler, &rig, "menu");
    step(&mut scheduler);
    assert_eq!(rig.position_polls.get(), 1);

    // info -> settings -> power -> temperature -> accelerometer -> gps
    for _ in 0..5 {
        press_and_step(&mut scheduler, &rig, "menu");
    }
    assert_eq!(scheduler.navigation().selected_module(), Some(2));
    step(&mut scheduler);
    assert_eq!(rig.position_polls.get(), 2, "re-entering gps polls even before the interval is due");
}

#[test]
fn test_failing_sensor_keeps_stale_value() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();

    step(&mut scheduler);
    assert_eq!(scheduler.state().temperature, Some(22.5));

    rig.thermometer_failing.set(true);
    rig.temperature.set(30.0);
    rig.advance_minutes(1);
    step(&mut scheduler);
    assert_eq!(scheduler.state().temperature, Some(22.5), "a failed poll keeps the last reading");
    assert_eq!(scheduler.state().air_pressure, Some(1013.2), "other sensors are still polled");

    rig.thermometer_failing.set(false);
    rig.advance_minutes(1);
    step(&mut scheduler);
    assert_eq!(scheduler.state().temperature, Some(30.0), "the sensor recovers on the next minute");
}

#[test]
fn test_sleep_blanks_until_any_press() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults::default());
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();

    step(&mut scheduler);
    for _ in 0..POWER_INDEX {
        press_and_step(&mut scheduler, &rig, "menu");
    }
    press_and_step(&mut scheduler, &rig, "select");
    press_and_step(&mut scheduler, &rig, "enter");
    assert!(scheduler.is_sleeping());
    assert!(!scheduler.last_frame().unwrap().statusbar_drawn, "asleep frames are blank");

    press_and_step(&mut scheduler, &rig, "menu");
    assert!(!scheduler.is_sleeping());
    assert_eq!(scheduler.navigation().selected_module(), Some(POWER_INDEX), "the waking press is consumed");
    assert!(scheduler.last_frame().unwrap().statusbar_drawn);
}

#[test]
fn test_display_failure_ends_the_loop() {
    let ctx = Context::new(test_config(true));
    let (mut devices, _rig) = rig(Faults {
        flush: true,
        ..Faults::default()
    });
    let mut screen = Screen::new(Size::new(320, 240));
    let registry = ModuleRegistry::from_config(&ctx.config().modules);
    let mut scheduler = Scheduler::new(&ctx, &mut devices, &mut screen, registry).unwrap();

    let reason = scheduler.run(&AtomicBool::new(false));
    assert!(matches!(reason, StopReason::Failed(_)), "got {:?}", reason);
}

#[test]
fn test_teardown_closes_everything_even_when_closes_fail() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults {
        closes: true,
        ..Faults::default()
    });
    let mut screen = Screen::new(Size::new(320, 240));

    lifecycle::teardown(&ctx, &mut devices, &mut screen);
    let events = rig.events.borrow().clone();
    assert_eq!(events, ["flush", "display.close", "input.close", "battery.close", "gps.close"]);
}

#[test]
fn test_interrupt_runs_teardown() {
    let ctx = Context::new(test_config(true));
    let (mut devices, rig) = rig(Faults::default());

    let reason = lifecycle::run(&ctx, &mut devices, &AtomicBool::new(true));
    assert_eq!(reason, StopReason::Interrupted);
    let events = rig.events.borrow().clone();
    assert_eq!(events.first(), Some(&"storage.clean"), "startup cleans old output first");
    assert!(events.ends_with(&["flush", "display.close", "input.close", "battery.close", "gps.close"]));
}

#[test]
fn test_reboot_runs_after_teardown() {
    let ctx = Context::new(test_config(false));
    let (mut devices, rig) = rig(Faults::default());
    for _ in 0..POWER_INDEX {
        rig.press("menu");
    }
    for _ in 0..=REBOOT_OPTION {
        rig.press("select");
    }
    rig.press("enter");

    let reason = lifecycle::run(&ctx, &mut devices, &AtomicBool::new(false));
    assert_eq!(reason, StopReason::Power(kleine::actions::PowerAction::Reboot));
    let events = rig.events.borrow().clone();
    assert!(
        events.ends_with(&["flush", "display.close", "input.close", "battery.close", "gps.close", "reboot"]),
        "reboot must follow teardown: {:?}",
        events
    );
}
