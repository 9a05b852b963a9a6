//! Layout constants shared by every widget.
//!
//! Widgets read the screen size from the draw target's bounding box, so the
//! same code serves the 320x240 panel and any other configured size. Only
//! bar heights, paddings and icon sizes are fixed here.

/// Default display width in pixels (ST7789 in landscape).
pub const SCREEN_WIDTH: u32 = 320;

/// Default display height in pixels.
pub const SCREEN_HEIGHT: u32 = 240;

/// Status header height in pixels.
pub const HEADER_HEIGHT: u32 = 24;

/// Status footer height in pixels.
pub const FOOTER_HEIGHT: u32 = 18;

/// Edge padding for header, footer and body text.
pub const PADDING: i32 = 4;

/// Horizontal gap between right-aligned header items.
pub const HEADER_ITEM_GAP: i32 = 4;

/// Side length of status header icons.
pub const HEADER_ICON_SIZE: u32 = 14;

/// Side length of the large icon drawn in module bodies.
pub const BODY_ICON_SIZE: u32 = 48;

/// Modal border thickness.
pub const MODAL_BORDER: u32 = 3;

/// Inner padding between the modal border and its text.
pub const MODAL_PADDING: u32 = 8;

/// Fraction of the screen width taken by the modal box, in percent.
pub const MODAL_WIDTH_PERCENT: u32 = 80;

/// Height of one row in the selectable option list.
pub const LIST_ROW_HEIGHT: u32 = 22;

const _: () = assert!(HEADER_HEIGHT + FOOTER_HEIGHT < SCREEN_HEIGHT);
const _: () = assert!(HEADER_ICON_SIZE < HEADER_HEIGHT);
