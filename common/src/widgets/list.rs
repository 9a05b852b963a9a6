//! Selectable option list with an inverted selected row.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};

use crate::{
    colors::WHITE,
    config::{LIST_ROW_HEIGHT, PADDING},
    styles::{MEDIUM_BLACK, MEDIUM_WHITE, MIDDLE_LEFT},
};

const SELECTED_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(WHITE);

/// Horizontal inset of the list from both screen edges.
const LIST_INSET: i32 = PADDING * 4;

/// Draw `items` as rows starting at `top`. The row at `selected` gets a white
/// background and black text.
pub fn draw_option_list<D>(display: &mut D, items: &[&str], selected: Option<usize>, top: i32)
where
    D: DrawTarget<Color = Rgb565>,
{
    let width = display.bounding_box().size.width;
    let row_width = width.saturating_sub(2 * LIST_INSET as u32);

    for (index, item) in items.iter().enumerate() {
        let row_top = top + (index as u32 * LIST_ROW_HEIGHT) as i32;
        let text_pos = Point::new(LIST_INSET + PADDING, row_top + LIST_ROW_HEIGHT as i32 / 2);

        if selected == Some(index) {
            Rectangle::new(Point::new(LIST_INSET, row_top), Size::new(row_width, LIST_ROW_HEIGHT))
                .into_styled(SELECTED_FILL)
                .draw(display)
                .ok();
            Text::with_text_style(item, text_pos, MEDIUM_BLACK, MIDDLE_LEFT)
                .draw(display)
                .ok();
        } else {
            Text::with_text_style(item, text_pos, MEDIUM_WHITE, MIDDLE_LEFT)
                .draw(display)
                .ok();
        }
    }
}
