//! Width measurement hooks.
//!
//! Rendering lives outside the engine; the packer only needs a deterministic
//! width for each word in the same units as the page's maximum line width.

use unicode_normalization::UnicodeNormalization;

/// Rendered width of a word.
pub trait TextMeasurer {
    fn measure(&self, text: &str) -> f32;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str) -> f32,
{
    fn measure(&self, text: &str) -> f32 {
        self(text)
    }
}

/// Fixed advance per composed character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    pub glyph_advance: f32,
}

impl MonospaceMeasurer {
    pub fn new(glyph_advance: f32) -> Self {
        Self { glyph_advance }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str) -> f32 {
        text.nfc().count() as f32 * self.glyph_advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_counts_composed_characters() {
        let measurer = MonospaceMeasurer::new(10.0);
        // "e" + combining acute composes to one glyph.
        assert_eq!(measurer.measure("cafe\u{301}"), 40.0);
        assert_eq!(measurer.measure("toad"), 40.0);
    }

    #[test]
    fn closures_measure_too() {
        let measurer = |text: &str| text.len() as f32 * 2.0;
        assert_eq!(measurer.measure("abc"), 6.0);
    }
}
