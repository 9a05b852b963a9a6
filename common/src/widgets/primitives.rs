//! Low-level text and line helpers shared across widgets and module bodies.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::Text;

use crate::colors::GRAY;
use crate::styles::{CENTERED, TOP_LEFT};

/// Extra pixels between consecutive lines of a text block.
const LINE_SPACING: u32 = 2;

/// Draw multi-line text with its first line's top-left corner at `top_left`.
///
/// Lines are drawn one by one so the block anchor does not depend on how the
/// text style treats multi-line baselines. Returns the block height.
pub fn draw_text_block<D>(display: &mut D, text: &str, top_left: Point, style: MonoTextStyle<'_, Rgb565>) -> u32
where
    D: DrawTarget<Color = Rgb565>,
{
    let line_height = style.font.character_size.height + LINE_SPACING;
    let mut y = top_left.y;
    let mut lines = 0;
    for line in text.lines() {
        Text::with_text_style(line, Point::new(top_left.x, y), style, TOP_LEFT)
            .draw(display)
            .ok();
        y += line_height as i32;
        lines += 1;
    }
    lines * line_height
}

/// Draw a single line of text centered on `center` in both axes.
pub fn draw_centered_text<D>(display: &mut D, text: &str, center: Point, style: MonoTextStyle<'_, Rgb565>)
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_text_style(text, center, style, CENTERED).draw(display).ok();
}

/// Draw a full-width gray divider at row `y`.
pub fn draw_divider<D>(display: &mut D, y: i32)
where
    D: DrawTarget<Color = Rgb565>,
{
    let width = display.bounding_box().size.width as i32;
    Line::new(Point::new(0, y), Point::new(width - 1, y))
        .into_styled(PrimitiveStyle::with_stroke(GRAY, 1))
        .draw(display)
        .ok();
}
