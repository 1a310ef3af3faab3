//! Text measurement
//!
//! Layout never shapes text itself; it asks a [`TextMetrics`] for the pixel
//! width of each run. [`FontMetrics`](crate::raster::FontMetrics) answers
//! from real glyph advances, [`EstimatedMetrics`] from a fixed per-character
//! advance when no font is at hand.

use crate::style::Style;

pub trait TextMetrics {
    /// Rendered width of `text` in pixels
    fn text_width(&self, text: &str, style: &Style) -> f32;
}

impl<T: TextMetrics + ?Sized> TextMetrics for &T {
    fn text_width(&self, text: &str, style: &Style) -> f32 {
        (**self).text_width(text, style)
    }
}

/// Every character advances by `font_size * advance_ratio`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedMetrics {
    advance_ratio: f32,
}

impl EstimatedMetrics {
    pub const DEFAULT_ADVANCE_RATIO: f32 = 0.55;

    pub fn new() -> Self {
        Self::with_advance_ratio(Self::DEFAULT_ADVANCE_RATIO)
    }

    pub fn with_advance_ratio(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }
}

impl Default for EstimatedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMetrics for EstimatedMetrics {
    fn text_width(&self, text: &str, style: &Style) -> f32 {
        text.chars().count() as f32 * style.font_size * self.advance_ratio
    }
}
