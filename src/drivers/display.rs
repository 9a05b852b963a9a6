//! Display devices.
//!
//! Both devices keep a [`SimulatorDisplay`] as their target buffer and copy
//! the finished [`Canvas`] into it on flush:
//!
//! - [`PngDisplay`] writes every flushed frame to `<dir>/<timestamp>.png` and
//!   mirrors it to `<dir>/_latest.png`, for headless runs and boards without
//!   a panel.
//! - [`WindowDisplay`] shows frames in an SDL window on the desktop. The
//!   window is shared with the keyboard input through [`SharedWindow`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Local;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettings, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};

use super::DisplayDevice;
use crate::canvas::Canvas;
use crate::error::DisplayError;

/// File that always holds the most recent frame.
pub const LATEST_FRAME: &str = "_latest.png";

// =============================================================================
// PNG frame dump
// =============================================================================

pub struct PngDisplay {
    dir: PathBuf,
    buffer: SimulatorDisplay<Rgb565>,
    settings: OutputSettings,
    closed: bool,
}

impl PngDisplay {
    /// Create `dir` if needed and dump frames of `size` pixels into it.
    pub fn new(dir: &Path, size: Size) -> Result<Self, DisplayError> {
        fs::create_dir_all(dir)?;
        log::info!("writing frames to {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            buffer: SimulatorDisplay::new(size),
            settings: OutputSettingsBuilder::new().scale(1).build(),
            closed: false,
        })
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FRAME)
    }

    fn save(&self, path: &Path) -> Result<(), DisplayError> {
        self.buffer
            .to_rgb_output_image(&self.settings)
            .save_png(path)
            .map_err(|err| DisplayError::Encode {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }
}

impl DisplayDevice for PngDisplay {
    fn flush(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        canvas.copy_to(&mut self.buffer).ok();

        let stamp = Local::now().format("%Y%m%d_%H%M%S%.3f");
        self.save(&self.dir.join(format!("{}.png", stamp)))?;
        self.save(&self.latest_path())
    }

    fn screen_size(&self) -> Size {
        self.buffer.size()
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.closed = true;
        Ok(())
    }
}

// =============================================================================
// Simulator window
// =============================================================================

/// SDL window plus whether it has been shown yet. SDL only creates the
/// window on the first `update`, and polling events before that panics.
pub struct SimulatorWindow {
    window: Window,
    shown: bool,
}

pub type SharedWindow = Rc<RefCell<SimulatorWindow>>;

impl SimulatorWindow {
    pub fn shared(title: &str, scale: u32) -> SharedWindow {
        let settings = OutputSettingsBuilder::new().scale(scale.max(1)).build();
        Rc::new(RefCell::new(Self {
            window: Window::new(title, &settings),
            shown: false,
        }))
    }

    fn show(&mut self, display: &SimulatorDisplay<Rgb565>) {
        self.window.update(display);
        self.shown = true;
    }

    /// Pending SDL events, empty until the first frame was shown.
    pub fn drain_events(&mut self) -> Vec<SimulatorEvent> {
        if !self.shown {
            return Vec::new();
        }
        self.window.events().collect()
    }
}

pub struct WindowDisplay {
    window: SharedWindow,
    buffer: SimulatorDisplay<Rgb565>,
    closed: bool,
}

impl WindowDisplay {
    pub fn new(window: SharedWindow, size: Size) -> Self {
        Self {
            window,
            buffer: SimulatorDisplay::new(size),
            closed: false,
        }
    }
}

impl DisplayDevice for WindowDisplay {
    fn flush(&mut self, canvas: &Canvas) -> Result<(), DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        canvas.copy_to(&mut self.buffer).ok();
        self.window.borrow_mut().show(&self.buffer);
        Ok(())
    }

    fn screen_size(&self) -> Size {
        self.buffer.size()
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.closed = true;
        Ok(())
    }
}
