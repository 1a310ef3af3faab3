//! Software rasterization
//!
//! A plain `0x00RRGGBB` pixel buffer and a fontdue-backed text backend that
//! both measures runs for the layout engine and paints them for the
//! renderer. No GPU dependencies for maximum portability.

use crate::error::{Result, ViewError};
use crate::metrics::TextMetrics;
use crate::renderer::Canvas;
use crate::style::{Color, Role, Style};
use fontdue::{Font, FontSettings};
use std::path::Path;

/// Pixel buffer for rendering
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xFFFFFF; width * height], // White background
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Blend `color` over the pixel at (x, y) with the given coverage
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: u32, alpha: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let slot = &mut self.pixels[y * self.width + x];
        *slot = blend(*slot, color, alpha);
    }
}

fn blend(under: u32, over: u32, alpha: u8) -> u32 {
    let a = u32::from(alpha);
    [16u32, 8, 0].iter().fold(0, |acc, &shift| {
        let bg = (under >> shift) & 0xFF;
        let fg = (over >> shift) & 0xFF;
        acc | (((fg * a + bg * (255 - a)) / 255) << shift)
    })
}

/// Text metrics from a real font's glyph advances
pub struct FontMetrics {
    font: Font,
}

impl FontMetrics {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| ViewError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        log::debug!("loaded font {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(&data)
    }

    pub fn font(&self) -> &Font {
        &self.font
    }
}

/// Pen movement for one glyph, snapped up to whole pixels. Shared by
/// measuring and painting: a painted run ends at its measured width.
fn pen_advance(advance_width: f32) -> f32 {
    advance_width.ceil()
}

impl TextMetrics for FontMetrics {
    fn text_width(&self, text: &str, style: &Style) -> f32 {
        // Advances rather than bitmap extents, so trailing spaces count
        text.chars()
            .map(|c| pen_advance(self.font.metrics(c, style.font_size).advance_width))
            .sum()
    }
}

/// Paints text runs into a [`FrameBuffer`] with one font
pub struct FontCanvas<'a> {
    fb: &'a mut FrameBuffer,
    font: &'a Font,
}

impl<'a> FontCanvas<'a> {
    pub fn new(fb: &'a mut FrameBuffer, font: &'a Font) -> Self {
        Self { fb, font }
    }

    fn blit(&mut self, bitmap: &[u8], width: usize, left: i32, top: i32, color: Color) {
        if width == 0 {
            return;
        }
        let rgb = color.to_u32();
        for (row, line) in bitmap.chunks(width).enumerate() {
            let py = top + row as i32;
            if py < 0 {
                continue;
            }
            for (col, &coverage) in line.iter().enumerate() {
                let px = left + col as i32;
                let alpha = scale_alpha(coverage, color);
                if px >= 0 && alpha > 0 {
                    self.fb.blend_pixel(px as usize, py as usize, rgb, alpha);
                }
            }
        }
    }
}

impl Canvas for FontCanvas<'_> {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, _role: Role, style: &Style) {
        let baseline = y.round() as i32;
        let mut pen = x;
        for c in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(c, style.font_size);
            let left = (pen + metrics.xmin as f32).floor() as i32;
            let top = baseline - metrics.ymin - metrics.height as i32;
            self.blit(&bitmap, metrics.width, left, top, style.color);
            pen += pen_advance(metrics.advance_width);
        }
    }
}

fn scale_alpha(coverage: u8, color: Color) -> u8 {
    ((coverage as u32 * color.a as u32) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framebuffer_starts_white() {
        let fb = FrameBuffer::new(4, 3);
        assert_eq!(fb.pixels.len(), 12);
        assert_eq!(fb.pixel(3, 2), Some(0xFFFFFF));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn blending_mixes_toward_the_foreground() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.blend_pixel(0, 0, 0x000000, 255);
        fb.blend_pixel(1, 0, 0x000000, 0);
        assert_eq!(fb.pixel(0, 0), Some(0x000000));
        assert_eq!(fb.pixel(1, 0), Some(0xFFFFFF));

        fb.clear(0xFFFFFF);
        fb.blend_pixel(0, 0, 0x000000, 128);
        let mixed = fb.pixel(0, 0).unwrap() & 0xFF;
        assert!(mixed > 0x70 && mixed < 0x90);
    }

    #[test]
    fn out_of_bounds_blends_are_ignored() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.blend_pixel(5, 5, 0x000000, 255);
        assert_eq!(fb.pixels, vec![0xFFFFFF]);
    }

    #[test]
    fn color_alpha_scales_coverage() {
        assert_eq!(scale_alpha(255, Color::BLACK), 255);
        assert_eq!(scale_alpha(200, Color { a: 0, ..Color::BLACK }), 0);
        assert_eq!(scale_alpha(255, Color { a: 51, ..Color::BLACK }), 51);
    }

    const TEST_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    fn test_font() -> Option<FontMetrics> {
        let path = Path::new(TEST_FONT);
        if !path.exists() {
            eprintln!("{} not installed, skipping", TEST_FONT);
            return None;
        }
        FontMetrics::load(path).ok()
    }

    fn style(size: f32) -> Style {
        Style {
            color: Color::BLACK,
            font_size: size,
        }
    }

    #[test]
    fn measured_width_matches_fontdue_pen() {
        use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

        let Some(metrics) = test_font() else { return };
        let font = metrics.font();
        let sentinel_xmin = font.metrics('H', 20.0).bounds.xmin;
        for text in ["\"Tokyo\"", "AVAVAVAV", "1.5"] {
            let width = metrics.text_width(text, &style(20.0));
            let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
            layout.reset(&LayoutSettings::default());
            layout.append(&[font], &TextStyle::new(&format!("{text}H"), 20.0, 0));
            let sentinel = layout.glyphs().last().map(|g| g.x);
            assert_eq!(sentinel, Some((width + sentinel_xmin).floor()), "{text}");
        }
    }

    #[test]
    fn painted_run_stays_inside_its_measured_width() {
        let Some(metrics) = test_font() else { return };
        let text = "\"Tokyo\"";
        let width = metrics.text_width(text, &style(20.0));
        let mut fb = FrameBuffer::new(200, 40);
        FontCanvas::new(&mut fb, metrics.font()).draw_text(text, 10.0, 30.0, Role::PropertyValue, &style(20.0));

        let inked: Vec<usize> = (0..fb.width)
            .filter(|&x| (0..fb.height).any(|y| fb.pixel(x, y) != Some(0xFFFFFF)))
            .collect();
        assert!(!inked.is_empty());
        assert!(*inked.first().unwrap() >= 10);
        assert!((*inked.last().unwrap() as f32) < 10.0 + width);
    }

    #[test]
    fn widths_are_whole_pixels() {
        let Some(metrics) = test_font() else { return };
        let width = metrics.text_width("AVAVAVAV", &style(20.0));
        assert_eq!(width, width.round());
        assert!(width > 0.0);
    }

    #[test]
    fn invalid_font_bytes_are_a_font_error() {
        assert!(matches!(FontMetrics::from_bytes(b"not a font"), Err(ViewError::Font(_))));
    }
}
