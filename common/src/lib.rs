//! Shared drawing code for the Kleine kiosk.
//!
//! Platform-agnostic pieces used by the controller binary and its tests:
//!
//! - [`colors`]: RGB565 color constants
//! - [`config`]: Layout constants (bar heights, paddings, icon sizes)
//! - [`styles`]: Pre-computed text styles
//! - [`thresholds`]: Battery and signal thresholds
//! - [`levels`]: Battery and signal color classes
//! - [`icons`]: Module and status icons built from primitives
//! - [`wrap`]: Greedy word wrap against a rendered width
//! - [`widgets`]: Header, footer, modal, option list and text helpers
//!
//! # no_std Compatibility
//!
//! This crate is `no_std` and only needs `alloc` for wrapped strings.

#![no_std]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

pub mod colors;
pub mod config;
pub mod icons;
pub mod levels;
pub mod styles;
pub mod thresholds;
pub mod widgets;
pub mod wrap;

// Re-export commonly used items
pub use colors::*;
pub use icons::Icon;
pub use levels::{BatteryLevel, SignalQuality};
