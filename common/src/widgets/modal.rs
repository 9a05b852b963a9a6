//! Modal message box.
//!
//! The box is centered on screen with a white border around a red
//! background, sized to the wrapped message. It is drawn last in a frame so
//! it covers whatever the module body drew underneath.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::colors::{RED, WHITE};
use crate::config::{MODAL_BORDER, MODAL_PADDING, MODAL_WIDTH_PERCENT};
use crate::styles::{MEDIUM_FONT, MEDIUM_WHITE};
use crate::widgets::draw_centered_text;
use crate::wrap::wrap_or_unwrapped;

const WHITE_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(WHITE);
const RED_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(RED);

/// Draw `message` in a centered modal box.
///
/// Blank messages draw nothing and return `false`.
pub fn draw_modal<D>(display: &mut D, message: &str) -> bool
where
    D: DrawTarget<Color = Rgb565>,
{
    if message.trim().is_empty() {
        return false;
    }

    let screen = display.bounding_box().size;
    let box_width = screen.width * MODAL_WIDTH_PERCENT / 100;
    let text_width = box_width.saturating_sub(2 * MODAL_PADDING);
    let wrapped = wrap_or_unwrapped(message, MEDIUM_FONT, text_width);

    let line_height = MEDIUM_FONT.character_size.height;
    let line_count = wrapped.lines().count().max(1) as u32;
    let max_height = screen.height.saturating_sub(2 * MODAL_BORDER);
    let box_height = (line_count * line_height + 2 * MODAL_PADDING).min(max_height);

    let x = (screen.width - box_width) as i32 / 2;
    let y = (screen.height - box_height) as i32 / 2;
    let border = MODAL_BORDER as i32;

    Rectangle::new(
        Point::new(x - border, y - border),
        Size::new(box_width + 2 * MODAL_BORDER, box_height + 2 * MODAL_BORDER),
    )
    .into_styled(WHITE_FILL)
    .draw(display)
    .ok();
    Rectangle::new(Point::new(x, y), Size::new(box_width, box_height))
        .into_styled(RED_FILL)
        .draw(display)
        .ok();

    let center_x = screen.width as i32 / 2;
    let mut line_center_y = y + MODAL_PADDING as i32 + line_height as i32 / 2;
    for line in wrapped.lines() {
        draw_centered_text(display, line, Point::new(center_x, line_center_y), MEDIUM_WHITE);
        line_center_y += line_height as i32;
    }
    true
}
