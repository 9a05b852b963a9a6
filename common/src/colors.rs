//! Color constants for the kiosk screens.
//!
//! Standard colors come from the `RgbColor` trait constants so they stay exact
//! for the RGB565 format (5 bits red, 6 bits green, 5 bits blue) that the
//! ST7789 panel and the simulator both consume without conversion.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Pure black. Screen background and inverted list text.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Body text, modal border, selected list row.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Pure red. Low battery, poor signal, modal background.
pub const RED: Rgb565 = Rgb565::RED;

/// Pure green. High or charging battery, good signal.
pub const GREEN: Rgb565 = Rgb565::GREEN;

/// Pure yellow. Splash title.
pub const YELLOW: Rgb565 = Rgb565::YELLOW;

// =============================================================================
// Custom Colors
// =============================================================================

/// Orange warning color for medium battery and weak signal.
/// RGB565: (31, 32, 0) - slightly darker than yellow.
pub const ORANGE: Rgb565 = Rgb565::new(31, 32, 0);

/// Dark gray for divider lines and unknown signal quality.
/// RGB565: (8, 16, 8) - roughly 25% brightness.
pub const GRAY: Rgb565 = Rgb565::new(8, 16, 8);

/// Header and footer bar background.
/// RGB565: (3, 6, 3) - just above black so the bars read as separate strips.
pub const BAR_BACKGROUND: Rgb565 = Rgb565::new(3, 6, 3);

/// Secondary text such as footer hints.
/// RGB565: (20, 40, 20) - light gray.
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(20, 40, 20);
