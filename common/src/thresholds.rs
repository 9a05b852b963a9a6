//! Threshold values for status colors.
//!
//! All thresholds are strict lower bounds: a value must be *above* the
//! constant to reach the level. Compile-time assertions keep the ordering
//! consistent.

// =============================================================================
// Battery Thresholds (percent)
// =============================================================================

/// Above this percentage the battery renders green.
pub const BATTERY_HIGH: u8 = 60;

/// Above this percentage (and up to `BATTERY_HIGH`) the battery renders orange.
/// At or below it the battery renders red.
pub const BATTERY_MEDIUM: u8 = 30;

// =============================================================================
// GPS Signal Thresholds (satellites in view, with a fix)
// =============================================================================

/// At least this many satellites counts as a good GPS signal.
pub const GPS_GOOD_SATELLITES: u8 = 6;

/// At least this many satellites counts as a weak GPS signal.
pub const GPS_WEAK_SATELLITES: u8 = 2;

// =============================================================================
// WiFi Link Quality Thresholds (percent of the driver maximum)
// =============================================================================

/// At least this link quality counts as a good WiFi signal.
pub const WIFI_GOOD: u8 = 60;

/// At least this link quality counts as a weak WiFi signal.
pub const WIFI_WEAK: u8 = 30;

const _: () = assert!(BATTERY_MEDIUM < BATTERY_HIGH);
const _: () = assert!(BATTERY_HIGH < 100);
const _: () = assert!(GPS_WEAK_SATELLITES < GPS_GOOD_SATELLITES);
const _: () = assert!(WIFI_WEAK < WIFI_GOOD);

#[cfg(test)]
#[allow(clippy::assertions_on_constants)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_threshold_ordering() {
        assert!(BATTERY_MEDIUM < BATTERY_HIGH);
    }

    #[test]
    fn test_signal_threshold_ordering() {
        assert!(GPS_WEAK_SATELLITES < GPS_GOOD_SATELLITES);
        assert!(WIFI_WEAK < WIFI_GOOD);
    }
}
