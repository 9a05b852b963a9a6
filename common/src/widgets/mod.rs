//! Widget components for the kiosk screens.
//!
//! All widgets are generic over `DrawTarget<Color = Rgb565>` and read the
//! screen size from the target's bounding box.

mod footer;
mod header;
mod list;
mod modal;
mod primitives;

pub use footer::draw_footer;
pub use header::{BatteryStatus, HeaderData, draw_header};
pub use list::draw_option_list;
pub use modal::draw_modal;
pub use primitives::{draw_centered_text, draw_divider, draw_text_block};
