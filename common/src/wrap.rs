//! Greedy word wrapping against a rendered-width budget.
//!
//! Words accumulate into a line while its rendered width stays within the
//! budget. On overflow the line is committed and the overflowing word starts
//! the next one. Existing line breaks are kept as paragraph boundaries. Text
//! that already fits is returned untouched, and no word is ever dropped,
//! split or reordered.

use alloc::string::String;
use core::fmt;

use embedded_graphics::mono_font::MonoFont;

/// Text measurement failed, so the caller cannot know where to break.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WrapError {
    /// The font has no advance width for this character.
    Unmeasurable(char),
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmeasurable(c) => write!(f, "cannot measure character {:?}", c),
        }
    }
}

impl core::error::Error for WrapError {}

/// Rendered width of a single line of text.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> Result<u32, WrapError>;
}

impl TextMeasure for MonoFont<'_> {
    fn text_width(&self, text: &str) -> Result<u32, WrapError> {
        let mut count = 0u32;
        for c in text.chars() {
            if c.is_control() {
                return Err(WrapError::Unmeasurable(c));
            }
            count += 1;
        }
        if count == 0 {
            return Ok(0);
        }
        Ok(count * self.character_size.width + (count - 1) * self.character_spacing)
    }
}

/// Wrap `text` so that every line fits within `max_width`.
///
/// A single word wider than `max_width` stays whole on its own line.
pub fn wrap_text<M>(text: &str, measure: &M, max_width: u32) -> Result<String, WrapError>
where
    M: TextMeasure + ?Sized,
{
    let mut fits = true;
    for line in text.split('\n') {
        if measure.text_width(line)? > max_width {
            fits = false;
        }
    }
    if fits {
        return Ok(String::from(text));
    }

    let mut wrapped = String::with_capacity(text.len() + 8);
    for (index, paragraph) in text.split('\n').enumerate() {
        if index > 0 {
            wrapped.push('\n');
        }
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let mut candidate = String::with_capacity(line.len() + word.len() + 1);
            candidate.push_str(&line);
            candidate.push(' ');
            candidate.push_str(word);
            if measure.text_width(&candidate)? <= max_width {
                line = candidate;
            } else {
                wrapped.push_str(&line);
                wrapped.push('\n');
                line.clear();
                line.push_str(word);
            }
        }
        wrapped.push_str(&line);
    }
    Ok(wrapped)
}

/// Like [`wrap_text`], but a measurement failure returns the text unwrapped.
pub fn wrap_or_unwrapped<M>(text: &str, measure: &M, max_width: u32) -> String
where
    M: TextMeasure + ?Sized,
{
    match wrap_text(text, measure, max_width) {
        Ok(wrapped) => wrapped,
        Err(err) => {
            log::warn!("word wrap skipped: {}", err);
            String::from(text)
        }
    }
}
