//! Font loading and glyph-accurate text metrics.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use kurbo::Size;
use ov_core::metrics::{LINE_HEIGHT, TextMetrics};
use std::path::{Path, PathBuf};

/// Sans-serif fonts commonly present on desktop systems, tried in order.
pub fn default_font_paths() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// Parse a TrueType/OpenType font from raw bytes.
pub fn font_from_bytes(bytes: Vec<u8>) -> Option<FontArc> {
    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("invalid font data: {e}");
            None
        }
    }
}

/// Load the first readable, parseable font among `paths`.
pub fn load_first_font<P: AsRef<Path>>(paths: &[P]) -> Option<FontArc> {
    for path in paths {
        let path = path.as_ref();
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        if let Some(font) = font_from_bytes(bytes) {
            log::debug!("loaded font {}", path.display());
            return Some(font);
        }
    }
    log::debug!("no usable font among {} candidates", paths.len());
    None
}

/// Scale at which one em equals `font_size` px, matching CSS `font-size`.
///
/// `PxScale` measures ascent-to-descent height, not the em square.
pub fn px_scale(font: &FontArc, font_size: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(font_size * font.height_unscaled() / upem),
        _ => PxScale::from(font_size),
    }
}

/// Horizontal advance of `text` at `scale`, including kerning.
pub fn advance_width(font: &FontArc, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// [`TextMetrics`] backed by real glyph advances.
#[derive(Clone)]
pub struct GlyphMetrics {
    font: FontArc,
}

impl GlyphMetrics {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }
}

impl TextMetrics for GlyphMetrics {
    fn measure(&self, text: &str, font_size: f32) -> Size {
        let scale = px_scale(&self.font, font_size);
        let width = advance_width(&self.font, scale, text);
        Size::new(width as f64, font_size as f64 * LINE_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_paths_yield_none() {
        let paths = [PathBuf::from("/definitely/not/here.ttf")];
        assert!(load_first_font(&paths).is_none());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(font_from_bytes(b"not a font".to_vec()).is_none());
    }

    #[test]
    fn glyph_widths_grow_with_text() {
        let Some(font) = load_first_font(&default_font_paths()) else {
            // No system font on this machine; nothing to measure.
            return;
        };
        let metrics = GlyphMetrics::new(font);
        let short = metrics.measure("Hi", 30.0);
        let long = metrics.measure("Hi there", 30.0);
        assert!(long.width > short.width);
        assert_eq!(short.height, 36.0);
    }
}
