//! Label data model.
//!
//! A session holds an ordered list of [`TextLabel`]s drawn over one
//! background image. Label positions are image-local (see `geom`).

use crate::id::LabelId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// CSS named colors accepted for label text.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("magenta", [255, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("pink", [255, 192, 203]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("maroon", [128, 0, 0]),
    ("gold", [255, 215, 0]),
    ("brown", [165, 42, 42]),
];

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse a CSS color: a named color (`white`, `red`, …) or hex.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::from_hex(s);
        }
        if s.eq_ignore_ascii_case("transparent") {
            return Some(Self::rgba(0.0, 0.0, 0.0, 0.0));
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, [r, g, b])| Self::from_rgba8(*r, *g, *b, 255))
            .or_else(|| Self::from_hex(s))
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let mut c = [15u8; 4];
                for (slot, &b) in c.iter_mut().zip(bytes) {
                    *slot = hex_val(b)?;
                }
                Some(Self::from_rgba8(c[0] * 17, c[1] * 17, c[2] * 17, c[3] * 17))
            }
            6 | 8 => {
                let mut c = [255u8; 4];
                for (slot, pair) in c.iter_mut().zip(bytes.chunks(2)) {
                    *slot = hex_val(pair[0])? << 4 | hex_val(pair[1])?;
                }
                Some(Self::from_rgba8(c[0], c[1], c[2], c[3]))
            }
            _ => None,
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as hex, `#RRGGBB` when opaque and `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS form for the render surface: hex when opaque, `rgba()` otherwise.
    pub fn to_css(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            self.to_hex()
        } else {
            format!("rgba({r},{g},{b},{})", self.a)
        }
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }
}

// ─── Shadow ──────────────────────────────────────────────────────────────

/// Drop shadow under label text (CSS `text-shadow` semantics).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub offset_x: f32,
    pub offset_y: f32,
    /// Blur radius in px; the Gaussian sigma is half of it.
    pub blur: f32,
    pub color: Color,
}

impl Default for Shadow {
    /// `2px 2px 4px rgba(0, 0, 0, 0.7)`
    fn default() -> Self {
        Self {
            offset_x: 2.0,
            offset_y: 2.0,
            blur: 4.0,
            color: Color::rgba(0.0, 0.0, 0.0, 0.7),
        }
    }
}

impl Shadow {
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}",
            self.offset_x,
            self.offset_y,
            self.blur,
            self.color.to_css()
        )
    }
}

// ─── Labels ──────────────────────────────────────────────────────────────

/// A positioned, editable text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub id: LabelId,
    pub content: String,
    /// Top-left of the label box, image-local.
    pub position: Point,
    /// Font size in px. Always positive.
    pub font_size: f32,
    pub color: Color,
    pub shadow: Option<Shadow>,
}

impl TextLabel {
    pub fn new(id: LabelId, position: Point, defaults: &LabelDefaults) -> Self {
        Self {
            id,
            content: defaults.content.clone(),
            position,
            font_size: defaults.font_size,
            color: defaults.color,
            shadow: defaults.shadow,
        }
    }
}

/// Content and styling given to newly placed labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDefaults {
    pub content: String,
    pub font_size: f32,
    pub color: Color,
    pub shadow: Option<Shadow>,
}

impl Default for LabelDefaults {
    fn default() -> Self {
        Self {
            content: "New Text".to_string(),
            font_size: 30.0,
            color: Color::WHITE,
            shadow: Some(Shadow::default()),
        }
    }
}

impl LabelDefaults {
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// `None` unless `size` is finite and positive.
    pub fn with_font_size(mut self, size: f32) -> Option<Self> {
        if !size.is_finite() || size <= 0.0 {
            return None;
        }
        self.font_size = size;
        Some(self)
    }

    /// `None` if `color` doesn't parse (see [`Color::parse`]).
    pub fn with_color(mut self, color: &str) -> Option<Self> {
        self.color = Color::parse(color)?;
        Some(self)
    }

    pub fn without_shadow(mut self) -> Self {
        self.shadow = None;
        self
    }
}

// ─── Background ──────────────────────────────────────────────────────────

/// Background image reference. The handle is opaque to the core: a blob
/// URL, a file path, or whatever the image source provider hands out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    /// No image chosen: the placeholder is used.
    #[default]
    Default,
    Handle(String),
}

impl ImageSource {
    pub fn handle(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Handle(h) => Some(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named_and_hex() {
        assert_eq!(Color::parse("white"), Some(Color::WHITE));
        assert_eq!(Color::parse("  Black "), Some(Color::BLACK));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#FF000080").map(|c| c.to_rgba8()), Some([255, 0, 0, 128]));
        assert_eq!(Color::parse("00ff00").map(|c| c.to_rgba8()), Some([0, 255, 0, 255]));
        assert_eq!(Color::parse("chartreuse-ish"), None);
        assert_eq!(Color::parse("#12345"), None);
    }

    #[test]
    fn short_hex_alpha() {
        let c = Color::from_hex("#0f08").unwrap();
        assert_eq!(c.to_rgba8(), [0, 255, 0, 136]);
    }

    #[test]
    fn hex_roundtrip() {
        assert_eq!(Color::parse("orange").unwrap().to_hex(), "#FFA500");
        assert_eq!(Color::rgba(0.0, 0.0, 0.0, 0.5).to_hex(), "#00000080");
    }

    #[test]
    fn css_form() {
        assert_eq!(Color::WHITE.to_css(), "#FFFFFF");
        assert_eq!(Color::parse("white").unwrap().to_css(), "#FFFFFF");
        assert_eq!(Color::rgba(1.0, 0.0, 0.0, 0.25).to_css(), "rgba(255,0,0,0.25)");
    }

    #[test]
    fn defaults_match_page() {
        let d = LabelDefaults::default();
        assert_eq!(d.content, "New Text");
        assert_eq!(d.font_size, 30.0);
        assert_eq!(d.color, Color::WHITE);
        assert_eq!(
            d.shadow.map(|s| s.to_css()).as_deref(),
            Some("2px 2px 4px rgba(0,0,0,0.7)")
        );
    }

    #[test]
    fn font_size_must_be_positive() {
        assert!(LabelDefaults::default().with_font_size(0.0).is_none());
        assert!(LabelDefaults::default().with_font_size(-4.0).is_none());
        assert!(LabelDefaults::default().with_font_size(f32::NAN).is_none());
        assert_eq!(
            LabelDefaults::default().with_font_size(48.0).map(|d| d.font_size),
            Some(48.0)
        );
    }
}
