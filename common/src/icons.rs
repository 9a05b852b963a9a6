//! Vector icons drawn from primitives.
//!
//! The panel has no emoji font, so every module icon and status indicator is
//! composed from lines, circles and rectangles scaled to a square of `size`
//! pixels anchored at `top_left`.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, Circle, Line, PrimitiveStyle, Rectangle, Triangle};

use crate::colors::GRAY;
use crate::levels::SignalQuality;

/// Module icons shown on the left of the status header and in bodies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Icon {
    Thermometer,
    Accelerometer,
    Satellite,
    Car,
    Info,
    Gear,
    Power,
    Unknown,
}

/// Draw `icon` scaled into a `size` x `size` square.
pub fn draw_icon<D>(display: &mut D, icon: Icon, top_left: Point, size: u32, color: Rgb565)
where
    D: DrawTarget<Color = Rgb565>,
{
    let s = size as i32;
    let stroke_width = (size / 10).max(1);
    let stroke = PrimitiveStyle::with_stroke(color, stroke_width);
    let fill = PrimitiveStyle::with_fill(color);
    let at = |fx: i32, fy: i32| top_left + Point::new(fx * s / 12, fy * s / 12);
    let center = at(6, 6);

    match icon {
        Icon::Thermometer => {
            Rectangle::with_corners(at(5, 0), at(7, 8)).into_styled(stroke).draw(display).ok();
            Circle::with_center(at(6, 9), (size / 3).max(3)).into_styled(fill).draw(display).ok();
        }
        Icon::Accelerometer => {
            Circle::with_center(center, size - 2).into_styled(stroke).draw(display).ok();
            Line::new(at(6, 1), at(6, 11)).into_styled(stroke).draw(display).ok();
            Line::new(at(1, 6), at(11, 6)).into_styled(stroke).draw(display).ok();
            Circle::with_center(center, (size / 4).max(2)).into_styled(fill).draw(display).ok();
        }
        Icon::Satellite => {
            Rectangle::with_corners(at(4, 4), at(8, 8)).into_styled(fill).draw(display).ok();
            Rectangle::with_corners(at(0, 5), at(3, 7)).into_styled(stroke).draw(display).ok();
            Rectangle::with_corners(at(9, 5), at(12, 7)).into_styled(stroke).draw(display).ok();
            Line::new(at(6, 8), at(6, 11)).into_styled(stroke).draw(display).ok();
        }
        Icon::Car => {
            Rectangle::with_corners(at(0, 5), at(12, 9)).into_styled(fill).draw(display).ok();
            Rectangle::with_corners(at(3, 2), at(9, 5)).into_styled(stroke).draw(display).ok();
            let wheel = (size / 4).max(2);
            Circle::with_center(at(3, 10), wheel).into_styled(stroke).draw(display).ok();
            Circle::with_center(at(9, 10), wheel).into_styled(stroke).draw(display).ok();
        }
        Icon::Info => {
            Circle::with_center(center, size - 2).into_styled(stroke).draw(display).ok();
            Line::new(at(6, 5), at(6, 9)).into_styled(stroke).draw(display).ok();
            Circle::with_center(at(6, 3), (size / 8).max(1)).into_styled(fill).draw(display).ok();
        }
        Icon::Gear => {
            Circle::with_center(center, size * 2 / 3).into_styled(stroke).draw(display).ok();
            Line::new(at(6, 0), at(6, 2)).into_styled(stroke).draw(display).ok();
            Line::new(at(6, 10), at(6, 12)).into_styled(stroke).draw(display).ok();
            Line::new(at(0, 6), at(2, 6)).into_styled(stroke).draw(display).ok();
            Line::new(at(10, 6), at(12, 6)).into_styled(stroke).draw(display).ok();
        }
        Icon::Power => {
            Arc::with_center(center, size - 2, (-60.0f32).deg(), 300.0f32.deg())
                .into_styled(stroke)
                .draw(display)
                .ok();
            Line::new(at(6, 0), at(6, 6)).into_styled(stroke).draw(display).ok();
        }
        Icon::Unknown => {
            Rectangle::with_corners(at(1, 1), at(11, 11)).into_styled(stroke).draw(display).ok();
            Line::new(at(1, 1), at(11, 11)).into_styled(stroke).draw(display).ok();
            Line::new(at(11, 1), at(1, 11)).into_styled(stroke).draw(display).ok();
        }
    }
}

/// Draw a horizontal battery outline filled to `percentage`.
///
/// The icon is `width` x `height` including the terminal nub on the right.
pub fn draw_battery<D>(display: &mut D, top_left: Point, width: u32, height: u32, percentage: u8, color: Rgb565)
where
    D: DrawTarget<Color = Rgb565>,
{
    if width < 6 || height < 4 {
        return;
    }
    let body_width = width - 2;
    Rectangle::new(top_left, Size::new(body_width, height))
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(display)
        .ok();
    Rectangle::new(
        top_left + Point::new(body_width as i32, height as i32 / 4),
        Size::new(2, (height / 2).max(1)),
    )
    .into_styled(PrimitiveStyle::with_fill(color))
    .draw(display)
    .ok();

    let inner = body_width - 4;
    let level = inner * u32::from(percentage.min(100)) / 100;
    if level > 0 {
        Rectangle::new(top_left + Point::new(2, 2), Size::new(level, height - 4))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(display)
            .ok();
    }
}

/// Draw three ascending signal bars in a `size` square, lit according to
/// `quality`. Unlit bars are drawn gray.
pub fn draw_signal_bars<D>(display: &mut D, top_left: Point, size: u32, quality: SignalQuality)
where
    D: DrawTarget<Color = Rgb565>,
{
    let bar_width = (size / 4).max(1);
    let lit = quality.bars();
    for bar in 0..3u8 {
        let bar_height = size * u32::from(bar + 1) / 3;
        let x = top_left.x + i32::from(bar) * (bar_width as i32 + 1);
        let y = top_left.y + (size - bar_height) as i32;
        let color = if bar < lit { quality.color() } else { GRAY };
        Rectangle::new(Point::new(x, y), Size::new(bar_width, bar_height))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(display)
            .ok();
    }
}

/// Draw a WiFi fan (dot plus two arcs) in a `size` square colored by `quality`.
pub fn draw_wifi<D>(display: &mut D, top_left: Point, size: u32, quality: SignalQuality)
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = quality.color();
    let s = size as i32;
    let base = top_left + Point::new(s / 2, s - 1);
    let stroke = PrimitiveStyle::with_stroke(color, 1);

    Triangle::new(base, base + Point::new(-1, -2), base + Point::new(1, -2))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)
        .ok();
    for diameter in [size, size * 2 / 3] {
        Arc::with_center(base, diameter, (-135.0f32).deg(), 90.0f32.deg())
            .into_styled(stroke)
            .draw(display)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLACK, GREEN, WHITE};
    use embedded_graphics::mock_display::MockDisplay;

    fn lit_pixels(display: &MockDisplay<Rgb565>, color: Rgb565) -> usize {
        let mut count = 0;
        for y in 0..64 {
            for x in 0..64 {
                if display.get_pixel(Point::new(x, y)) == Some(color) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_every_icon_draws_something() {
        for icon in [
            Icon::Thermometer,
            Icon::Accelerometer,
            Icon::Satellite,
            Icon::Car,
            Icon::Info,
            Icon::Gear,
            Icon::Power,
            Icon::Unknown,
        ] {
            let mut display = MockDisplay::<Rgb565>::new();
            display.set_allow_overdraw(true);
            display.set_allow_out_of_bounds_drawing(true);
            draw_icon(&mut display, icon, Point::new(4, 4), 24, WHITE);
            assert!(lit_pixels(&display, WHITE) > 0, "{icon:?} drew nothing");
        }
    }

    #[test]
    fn test_battery_fill_grows_with_percentage() {
        let mut empty = MockDisplay::<Rgb565>::new();
        empty.set_allow_overdraw(true);
        draw_battery(&mut empty, Point::new(0, 0), 24, 12, 0, GREEN);

        let mut full = MockDisplay::<Rgb565>::new();
        full.set_allow_overdraw(true);
        draw_battery(&mut full, Point::new(0, 0), 24, 12, 100, GREEN);

        assert!(lit_pixels(&full, GREEN) > lit_pixels(&empty, GREEN));
    }

    #[test]
    fn test_unknown_signal_is_all_gray() {
        let mut display = MockDisplay::<Rgb565>::new();
        draw_signal_bars(&mut display, Point::new(0, 0), 12, SignalQuality::Unknown);
        assert!(lit_pixels(&display, GRAY) > 0);
        assert_eq!(lit_pixels(&display, BLACK), 0);
        assert_eq!(lit_pixels(&display, GREEN), 0);
    }
}
