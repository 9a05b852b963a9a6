//! Pre-computed static text styles.
//!
//! `MonoTextStyle`, `TextStyleBuilder` and friends are const fn in
//! embedded-graphics 0.8, so every fixed style lives here as a `const` and
//! widgets reference it directly. Styles with a runtime color are built from
//! the exposed font references.

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb565,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::PROFONT_24_POINT;

use crate::colors::{BLACK, LIGHT_GRAY, WHITE, YELLOW};

// =============================================================================
// Text Alignment Styles
// =============================================================================

/// Centered on both axes. Popups, large values, splash text.
pub const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

/// Left aligned, top baseline. Text blocks anchored at their top-left corner.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

/// Left aligned, vertically centered. Bar items on the left edge.
pub const MIDDLE_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Middle)
    .build();

/// Right aligned, vertically centered. Header items laid out right to left.
pub const MIDDLE_RIGHT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Middle)
    .build();

// =============================================================================
// Font References
// =============================================================================

/// Small font (6x10) used in bars and dense text blocks.
pub const SMALL_FONT: &MonoFont = &FONT_6X10;

/// Medium font (10x20) used for body text and list rows.
pub const MEDIUM_FONT: &MonoFont = &FONT_10X20;

/// Large font (`ProFont` 24pt) used for the headline value of a module.
pub const LARGE_FONT: &MonoFont = &PROFONT_24_POINT;

// =============================================================================
// Pre-computed Text Styles
// =============================================================================

/// Small white text for header values.
pub const SMALL_WHITE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, WHITE);

/// Small gray text for footer hints.
pub const SMALL_HINT: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, LIGHT_GRAY);

/// Medium white text for body blocks and unselected list rows.
pub const MEDIUM_WHITE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, WHITE);

/// Medium black text for the inverted (selected) list row.
pub const MEDIUM_BLACK: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, BLACK);

/// Large white text for headline values.
pub const LARGE_WHITE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&PROFONT_24_POINT, WHITE);

/// Large yellow text for the splash title.
pub const LARGE_YELLOW: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&PROFONT_24_POINT, YELLOW);
