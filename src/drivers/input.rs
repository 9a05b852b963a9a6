//! Buttons.
//!
//! Three logical buttons drive the whole UI: `menu` cycles modules, `select`
//! cycles options and `enter` triggers the selected option. Every backend
//! latches presses as they are detected and hands each one out exactly once
//! through [`InputAdapter::is_pressed`].

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use embedded_graphics_simulator::SimulatorEvent;
use embedded_graphics_simulator::sdl2::Keycode;

use super::InputAdapter;
use super::display::SharedWindow;
use super::sysfs::{read_trimmed, write_value};

/// Minimum time between accepted level changes on a GPIO line.
pub const CONTACT_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Button {
    Menu,
    Select,
    Enter,
}

impl Button {
    pub const ALL: [Self; 3] = [Self::Menu, Self::Select, Self::Enter];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Select => "select",
            Self::Enter => "enter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.as_str() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Pending presses, one slot per button.
#[derive(Debug, Default, Clone)]
pub struct PressLatch {
    pressed: [bool; 3],
}

impl PressLatch {
    pub fn set(&mut self, button: Button) {
        self.pressed[button.index()] = true;
    }

    /// Take the press of `name`. Unknown names are never pressed.
    pub fn take(&mut self, name: &str) -> bool {
        Button::from_name(name).is_some_and(|button| std::mem::take(&mut self.pressed[button.index()]))
    }
}

// =============================================================================
// Queued input
// =============================================================================

/// Presses pushed by other code, for headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct QueuedInput {
    latch: Rc<RefCell<PressLatch>>,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch a press. Clones of this input share the same latch.
    pub fn push(&self, button: Button) {
        self.latch.borrow_mut().set(button);
    }
}

impl InputAdapter for QueuedInput {
    fn is_pressed(&mut self, name: &str) -> bool {
        self.latch.borrow_mut().take(name)
    }
}

// =============================================================================
// Sysfs GPIO
// =============================================================================

/// Edge detector for one active-low line.
#[derive(Debug)]
struct ButtonState {
    was_pressed: bool,
    last_change: Option<Instant>,
}

impl ButtonState {
    const fn new() -> Self {
        Self {
            was_pressed: false,
            last_change: None,
        }
    }

    /// True only on the transition into the pressed level. Level changes
    /// closer than [`CONTACT_DEBOUNCE`] to the previous one are ignored.
    fn just_pressed(&mut self, is_low: bool, now: Instant) -> bool {
        if is_low == self.was_pressed {
            return false;
        }
        if let Some(last) = self.last_change
            && now.duration_since(last) < CONTACT_DEBOUNCE
        {
            return false;
        }
        self.was_pressed = is_low;
        self.last_change = Some(now);
        is_low
    }
}

#[derive(Debug)]
struct GpioLine {
    button: Button,
    pin: u32,
    value_path: PathBuf,
    state: ButtonState,
}

/// Buttons wired to GPIO lines with pull-ups, read through the sysfs GPIO
/// interface.
#[derive(Debug)]
pub struct SysfsButtons {
    root: PathBuf,
    lines: Vec<GpioLine>,
    latch: PressLatch,
}

impl SysfsButtons {
    /// Export each pin under `root` (unless already exported) and configure
    /// it as an input.
    pub fn open(root: &Path, pins: [(Button, u32); 3]) -> io::Result<Self> {
        let mut lines = Vec::with_capacity(pins.len());
        for (button, pin) in pins {
            let dir = root.join(format!("gpio{}", pin));
            if !dir.exists() {
                write_value(&root.join("export"), &pin.to_string())?;
            }
            write_value(&dir.join("direction"), "in")?;
            log::debug!("gpio{} configured for the {} button", pin, button.as_str());
            lines.push(GpioLine {
                button,
                pin,
                value_path: dir.join("value"),
                state: ButtonState::new(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
            lines,
            latch: PressLatch::default(),
        })
    }

    fn sample(&mut self) {
        let now = Instant::now();
        for line in &mut self.lines {
            match read_trimmed(&line.value_path) {
                Ok(level) => {
                    if line.state.just_pressed(level == "0", now) {
                        log::debug!("{} pressed", line.button.as_str());
                        self.latch.set(line.button);
                    }
                }
                Err(err) => log::debug!("gpio{} read failed: {}", line.pin, err),
            }
        }
    }
}

impl InputAdapter for SysfsButtons {
    fn is_pressed(&mut self, name: &str) -> bool {
        self.sample();
        self.latch.take(name)
    }

    fn close(&mut self) -> io::Result<()> {
        let mut result = Ok(());
        for line in self.lines.drain(..) {
            if let Err(err) = write_value(&self.root.join("unexport"), &line.pin.to_string()) {
                log::warn!("could not unexport gpio{}: {}", line.pin, err);
                result = result.and(Err(err));
            }
        }
        result
    }
}

// =============================================================================
// Simulator keyboard
// =============================================================================

/// Keyboard of the simulator window: Space is `menu`, Tab is `select` and
/// Return is `enter`. Closing the window raises `quit`.
pub struct KeyboardButtons {
    window: SharedWindow,
    latch: PressLatch,
    quit: Arc<AtomicBool>,
}

impl KeyboardButtons {
    pub fn new(window: SharedWindow, quit: Arc<AtomicBool>) -> Self {
        Self {
            window,
            latch: PressLatch::default(),
            quit,
        }
    }

    fn pump(&mut self) {
        let events = self.window.borrow_mut().drain_events();
        for event in events {
            match event {
                SimulatorEvent::Quit => {
                    log::info!("simulator window closed");
                    self.quit.store(true, Ordering::Relaxed);
                }
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    // Held keys would otherwise cycle modules.
                    if repeat {
                        continue;
                    }
                    if let Some(button) = key_button(keycode) {
                        self.latch.set(button);
                    }
                }
                _ => {}
            }
        }
    }
}

fn key_button(keycode: Keycode) -> Option<Button> {
    match keycode {
        Keycode::Space => Some(Button::Menu),
        Keycode::Tab => Some(Button::Select),
        Keycode::Return | Keycode::KpEnter => Some(Button::Enter),
        _ => None,
    }
}

impl InputAdapter for KeyboardButtons {
    fn is_pressed(&mut self, name: &str) -> bool {
        self.pump();
        self.latch.take(name)
    }
}
