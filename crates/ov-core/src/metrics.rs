//! Text extents used for hit testing and layout of label boxes.

use crate::model::TextLabel;
use kurbo::{Rect, Size};

/// Line box height as a multiple of font size (CSS `line-height: normal`).
pub const LINE_HEIGHT: f64 = 1.2;

/// Measures the box a label's text occupies when rendered.
pub trait TextMetrics {
    fn measure(&self, text: &str, font_size: f32) -> Size;
}

/// Font-free estimate: every char advances 0.6 em.
///
/// Good enough for hosts that draw text themselves and only need the core
/// to resolve which label sits under the pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMetrics;

impl TextMetrics for ApproxMetrics {
    fn measure(&self, text: &str, font_size: f32) -> Size {
        let em = font_size as f64;
        let chars = text.chars().filter(|c| !c.is_control()).count();
        Size::new(chars as f64 * em * 0.6, em * LINE_HEIGHT)
    }
}

impl<M: TextMetrics + ?Sized> TextMetrics for &M {
    fn measure(&self, text: &str, font_size: f32) -> Size {
        (**self).measure(text, font_size)
    }
}

/// Image-local box of a label.
///
/// Empty labels keep a half-em grab width so they remain selectable.
pub fn label_bounds(label: &TextLabel, metrics: &impl TextMetrics) -> Rect {
    let mut size = metrics.measure(&label.content, label.font_size);
    size.width = size.width.max(label.font_size as f64 * 0.5);
    Rect::from_origin_size(label.position, size)
}
