//! Status level classification for the header indicators.
//!
//! Readings are reduced to a small set of levels before drawing, so the
//! color decision is a pure function that can be tested without a display.

use embedded_graphics::pixelcolor::Rgb565;

use crate::colors::{GRAY, GREEN, ORANGE, RED};
use crate::thresholds::{BATTERY_HIGH, BATTERY_MEDIUM, GPS_GOOD_SATELLITES, GPS_WEAK_SATELLITES, WIFI_GOOD, WIFI_WEAK};

/// Battery color class shown in the status header.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BatteryLevel {
    /// Charging, at any percentage. Rendered green.
    Charging,
    /// Above [`BATTERY_HIGH`]. Rendered green.
    High,
    /// Above [`BATTERY_MEDIUM`]. Rendered orange.
    Medium,
    /// Everything else. Rendered red.
    Low,
}

impl BatteryLevel {
    /// Classify a battery reading. Charging overrides the percentage.
    pub const fn classify(percentage: u8, charging: bool) -> Self {
        if charging {
            Self::Charging
        } else if percentage > BATTERY_HIGH {
            Self::High
        } else if percentage > BATTERY_MEDIUM {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Charging | Self::High => GREEN,
            Self::Medium => ORANGE,
            Self::Low => RED,
        }
    }
}

/// Four-level signal quality used for both the GPS and WiFi icons.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SignalQuality {
    Good,
    Weak,
    Poor,
    #[default]
    Unknown,
}

impl SignalQuality {
    /// GPS quality from the fix indicator and satellite count.
    ///
    /// No fix information at all is `Unknown`; a fix of zero or too few
    /// satellites is `Poor`.
    pub fn from_gps(fix_quality: Option<u8>, satellites: Option<u8>) -> Self {
        match fix_quality {
            None => Self::Unknown,
            Some(0) => Self::Poor,
            Some(_) => match satellites.unwrap_or(0) {
                n if n >= GPS_GOOD_SATELLITES => Self::Good,
                n if n >= GPS_WEAK_SATELLITES => Self::Weak,
                _ => Self::Poor,
            },
        }
    }

    /// WiFi quality from a link quality percentage.
    pub const fn from_link_quality(percent: u8) -> Self {
        if percent >= WIFI_GOOD {
            Self::Good
        } else if percent >= WIFI_WEAK {
            Self::Weak
        } else if percent > 0 {
            Self::Poor
        } else {
            Self::Unknown
        }
    }

    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Good => GREEN,
            Self::Weak => ORANGE,
            Self::Poor => RED,
            Self::Unknown => GRAY,
        }
    }

    /// Number of lit bars out of three.
    pub const fn bars(self) -> u8 {
        match self {
            Self::Good => 3,
            Self::Weak => 2,
            Self::Poor => 1,
            Self::Unknown => 0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Weak => "weak",
            Self::Poor => "poor",
            Self::Unknown => "unknown",
        }
    }
}
