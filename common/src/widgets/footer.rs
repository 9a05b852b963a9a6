//! Status footer with the button hints.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};

use crate::{
    colors::BAR_BACKGROUND,
    config::{FOOTER_HEIGHT, PADDING},
    styles::{CENTERED, MIDDLE_LEFT, MIDDLE_RIGHT, SMALL_HINT},
    widgets::draw_divider,
};

const FOOTER_FILL_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(BAR_BACKGROUND);

/// Draw the footer. "menu" is always shown; "select" and "enter" only for
/// modules that have options.
pub fn draw_footer<D>(display: &mut D, has_options: bool)
where
    D: DrawTarget<Color = Rgb565>,
{
    let size = display.bounding_box().size;
    let top = (size.height - FOOTER_HEIGHT) as i32;
    let mid_y = top + FOOTER_HEIGHT as i32 / 2;

    Rectangle::new(Point::new(0, top), Size::new(size.width, FOOTER_HEIGHT))
        .into_styled(FOOTER_FILL_STYLE)
        .draw(display)
        .ok();
    draw_divider(display, top);

    Text::with_text_style("menu", Point::new(PADDING, mid_y), SMALL_HINT, MIDDLE_LEFT)
        .draw(display)
        .ok();

    if has_options {
        Text::with_text_style("select", Point::new(size.width as i32 / 2, mid_y), SMALL_HINT, CENTERED)
            .draw(display)
            .ok();
        Text::with_text_style("enter", Point::new(size.width as i32 - PADDING, mid_y), SMALL_HINT, MIDDLE_RIGHT)
            .draw(display)
            .ok();
    }
}
