//! Runtime state owned by the scheduler.
//!
//! - [`GatheredState`]: latest readings from every sensor
//! - [`NavigationState`]: selected module and option
//! - [`ModalMessage`]: transient overlay set by action handlers

mod gathered;
mod navigation;

pub use gathered::{BatteryReading, GatheredState, GpsReading, NetworkInfo, Orientation, Vector3};
pub use navigation::NavigationState;

/// Transient overlay text. With `wait` set, the scheduler holds the frame for
/// the modal dwell and then clears it with one extra redraw.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModalMessage {
    pub text: String,
    pub wait: bool,
}

impl ModalMessage {
    pub fn new(text: impl Into<String>, wait: bool) -> Self {
        Self { text: text.into(), wait }
    }

    /// Blank messages are never drawn.
    pub fn is_visible(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
