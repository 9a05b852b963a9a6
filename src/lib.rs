// Crate-level lints: pixel math casts are intentional
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

//! Kiosk controller for a single-board computer with a small LCD.
//!
//! The controller polls a handful of peripherals (temperature and humidity,
//! air pressure, motion, GPS, UPS battery, WiFi), renders their state one
//! module per screen and cycles through modules and options with three
//! buttons.
//!
//! # Architecture
//!
//! ```text
//! input ─▶ scheduler (navigation) ─▶ sensors (cadenced polling)
//!            │                          │
//!            │                          ▼
//!            │                    GatheredState
//!            ▼                          │
//!        FrameParams ◀──────────────────┘
//!            │
//!            ▼
//!         composer ─▶ Canvas ─▶ display
//! ```
//!
//! - [`scheduler`]: the cooperative main loop and its three cadences
//! - [`cadence`]: every-minute and every-N-seconds timing
//! - [`registry`]: module order and the options tree
//! - [`actions`]: what `enter` does on a selected option
//! - [`composer`]: header, body, modal and footer into one frame
//! - [`canvas`]: the single-writer framebuffer
//! - [`drivers`]: capability traits with mock and real devices
//! - [`lifecycle`]: splash, main loop and guarded teardown
//! - [`config`]: layered TOML configuration
//!
//! Drawing primitives shared with tests live in the `kleine-common` crate.

pub mod actions;
pub mod cadence;
pub mod canvas;
pub mod composer;
pub mod config;
pub mod context;
pub mod drivers;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod scheduler;
pub mod state;

pub use config::AppConfig;
pub use context::Context;
pub use error::Error;
pub use scheduler::{StepOutcome, StopReason};
