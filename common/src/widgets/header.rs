//! Status header: module icon on the left, status items right to left.
//!
//! Items are placed from the right edge with a fixed gap, each one moving the
//! cursor left by its own width. Disabled items take no space, so the
//! remaining ones close ranks against the right edge. Order from the right:
//! clock, battery, temperature, GPS signal, WiFi signal.

use core::fmt::Write;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};
use heapless::String;

use crate::{
    colors::{BAR_BACKGROUND, WHITE},
    config::{HEADER_HEIGHT, HEADER_ICON_SIZE, HEADER_ITEM_GAP, PADDING},
    icons::{Icon, draw_battery, draw_icon, draw_signal_bars, draw_wifi},
    levels::{BatteryLevel, SignalQuality},
    styles::{MIDDLE_RIGHT, SMALL_FONT, SMALL_WHITE},
    widgets::draw_divider,
    wrap::TextMeasure,
};

// =============================================================================
// Header Layout Constants
// =============================================================================

const HEADER_FILL_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(BAR_BACKGROUND);

/// Vertical center line of the header.
const HEADER_MID_Y: i32 = HEADER_HEIGHT as i32 / 2;

/// Top edge of header icons so they sit vertically centered.
const HEADER_ICON_Y: i32 = (HEADER_HEIGHT - HEADER_ICON_SIZE) as i32 / 2;

const BATTERY_ICON_WIDTH: u32 = 22;
const BATTERY_ICON_HEIGHT: u32 = 10;

/// Gap between the battery percentage text and its icon.
const BATTERY_TEXT_GAP: i32 = 2;

// =============================================================================
// Header Data
// =============================================================================

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BatteryStatus {
    pub percentage: u8,
    pub charging: bool,
}

/// Everything the header shows. `None` hides an item.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HeaderData {
    pub icon: Icon,
    /// Hours and minutes of the wall clock.
    pub clock: Option<(u32, u32)>,
    pub battery: Option<BatteryStatus>,
    /// Degrees Celsius.
    pub temperature: Option<f32>,
    pub gps: Option<SignalQuality>,
    pub wifi: Option<SignalQuality>,
}

// =============================================================================
// Drawing
// =============================================================================

/// Draw the status header. Returns the battery color class when the battery
/// item was drawn.
pub fn draw_header<D>(display: &mut D, data: &HeaderData) -> Option<BatteryLevel>
where
    D: DrawTarget<Color = Rgb565>,
{
    let width = display.bounding_box().size.width;

    Rectangle::new(Point::zero(), Size::new(width, HEADER_HEIGHT))
        .into_styled(HEADER_FILL_STYLE)
        .draw(display)
        .ok();
    draw_divider(display, HEADER_HEIGHT as i32 - 1);

    draw_icon(display, data.icon, Point::new(PADDING, HEADER_ICON_Y), HEADER_ICON_SIZE, WHITE);

    let mut cursor = width as i32 - PADDING;
    let mut battery_level = None;

    if let Some((hours, minutes)) = data.clock {
        let mut text: String<8> = String::new();
        let _ = write!(text, "{:02}:{:02}", hours, minutes);
        cursor = draw_right_text(display, &text, cursor);
    }

    if let Some(battery) = data.battery {
        let level = BatteryLevel::classify(battery.percentage, battery.charging);
        let icon_x = cursor - BATTERY_ICON_WIDTH as i32;
        let icon_y = HEADER_MID_Y - BATTERY_ICON_HEIGHT as i32 / 2;
        draw_battery(
            display,
            Point::new(icon_x, icon_y),
            BATTERY_ICON_WIDTH,
            BATTERY_ICON_HEIGHT,
            battery.percentage,
            level.color(),
        );
        cursor = icon_x - BATTERY_TEXT_GAP;

        let mut text: String<8> = String::new();
        let _ = write!(text, "{}%", battery.percentage.min(100));
        cursor = draw_right_text(display, &text, cursor);
        battery_level = Some(level);
    }

    if let Some(celsius) = data.temperature {
        let mut text: String<12> = String::new();
        let _ = write!(text, "{:.1}C", celsius);
        cursor = draw_right_text(display, &text, cursor);
    }

    if let Some(quality) = data.gps {
        let x = cursor - HEADER_ICON_SIZE as i32;
        draw_signal_bars(display, Point::new(x, HEADER_ICON_Y), HEADER_ICON_SIZE, quality);
        cursor = x - HEADER_ITEM_GAP;
    }

    if let Some(quality) = data.wifi {
        let x = cursor - HEADER_ICON_SIZE as i32;
        draw_wifi(display, Point::new(x, HEADER_ICON_Y), HEADER_ICON_SIZE, quality);
    }

    battery_level
}

/// Draw `text` ending at `right` and return the cursor for the next item.
fn draw_right_text<D>(display: &mut D, text: &str, right: i32) -> i32
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_text_style(text, Point::new(right, HEADER_MID_Y), SMALL_WHITE, MIDDLE_RIGHT)
        .draw(display)
        .ok();
    let text_width = SMALL_FONT.text_width(text).unwrap_or_default() as i32;
    right - text_width - HEADER_ITEM_GAP
}
