//! Composition → RGBA pixels.
//!
//! CPU rasterizer mirroring what the page shows: the background scaled to
//! cover the container, then every label bottom-to-top with its drop shadow.

use crate::font::{advance_width, px_scale};
use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use ov_core::metrics::LINE_HEIGHT;
use ov_core::model::{Color, Shadow, TextLabel};

/// Scale `background` to fill `width × height` and center-crop the overflow
/// (CSS `object-fit: cover`).
pub fn cover_fit(background: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if background.width() == width && background.height() == height {
        return background.to_rgba8();
    }
    log::trace!(
        "cover-fit {}x{} → {width}x{height}",
        background.width(),
        background.height()
    );
    background
        .resize_to_fill(width, height, FilterType::Triangle)
        .to_rgba8()
}

/// Paint labels (bottom to top) over an already-fitted background.
pub fn paint_labels(canvas: &mut RgbaImage, labels: &[TextLabel], font: &FontArc) {
    for label in labels {
        paint_label(canvas, font, label);
    }
}

pub fn paint_label(canvas: &mut RgbaImage, font: &FontArc, label: &TextLabel) {
    if label.content.is_empty() {
        return;
    }
    let origin = (label.position.x as f32, label.position.y as f32);
    if let Some(shadow) = &label.shadow {
        paint_shadow(canvas, font, label, shadow);
    }
    draw_text(canvas, font, origin, &label.content, label.font_size, label.color);
}

fn paint_shadow(canvas: &mut RgbaImage, font: &FontArc, label: &TextLabel, shadow: &Shadow) {
    let x = label.position.x as f32 + shadow.offset_x;
    let y = label.position.y as f32 + shadow.offset_y;

    if shadow.blur <= 0.0 {
        draw_text(canvas, font, (x, y), &label.content, label.font_size, shadow.color);
        return;
    }

    // Blur on a padded layer just big enough for the text, then composite.
    let sigma = shadow.blur / 2.0;
    let pad = (sigma * 3.0).ceil();
    let width = advance_width(font, px_scale(font, label.font_size), &label.content);
    let height = label.font_size * LINE_HEIGHT as f32;
    let layer_w = (width + pad * 2.0).ceil().max(1.0) as u32;
    let layer_h = (height + pad * 2.0).ceil().max(1.0) as u32;

    // Transparent pixels carry the shadow RGB so blurring only spreads alpha.
    let [r, g, b, _] = shadow.color.to_rgba8();
    let mut layer = RgbaImage::from_pixel(layer_w, layer_h, Rgba([r, g, b, 0]));
    draw_text(&mut layer, font, (pad, pad), &label.content, label.font_size, shadow.color);
    let blurred = imageops::blur(&layer, sigma);

    imageops::overlay(
        canvas,
        &blurred,
        (x - pad).round() as i64,
        (y - pad).round() as i64,
    );
}

/// Draw one line of text with its line box's top-left at `origin`.
///
/// The baseline sits half a leading below the line top, plus the ascent,
/// the way a browser lays out a single-line block.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &FontArc,
    origin: (f32, f32),
    text: &str,
    font_size: f32,
    color: Color,
) {
    let scaled = font.as_scaled(px_scale(font, font_size));
    let line_height = font_size * LINE_HEIGHT as f32;
    let glyph_height = scaled.ascent() - scaled.descent();
    let baseline = origin.1 + (line_height - glyph_height) / 2.0 + scaled.ascent();

    let rgba = color.to_rgba8();
    let mut caret = point(origin.0, baseline);
    let mut prev: Option<GlyphId> = None;

    for ch in text.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret.x += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scaled.scale(), caret);
        caret.x += scaled.h_advance(id);
        prev = Some(id);

        let Some(outlined) = scaled.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i64 + gx as i64;
            let py = bounds.min.y as i64 + gy as i64;
            blend_pixel(canvas, px, py, rgba, coverage);
        });
    }
}

/// Source-over blend of `rgba` at `coverage` onto one pixel. Out-of-bounds
/// writes are dropped.
fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, rgba: [u8; 4], coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = (rgba[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
    if alpha == 0 {
        return;
    }
    canvas
        .get_pixel_mut(x as u32, y as u32)
        .blend(&Rgba([rgba[0], rgba[1], rgba[2], alpha]));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_fit_fills_without_letterbox() {
        // Wide red image into a square: height matches, sides are cropped
        let wide = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 100, Rgba([255, 0, 0, 255])));
        let fitted = cover_fit(&wide, 50, 50);
        assert_eq!(fitted.dimensions(), (50, 50));
        assert!(fitted.pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn cover_fit_keeps_exact_size() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([1, 2, 3, 255])));
        assert_eq!(cover_fit(&img, 8, 6).get_pixel(7, 5).0, [1, 2, 3, 255]);
    }

    #[test]
    fn blend_pixel_ignores_out_of_bounds() {
        let mut canvas = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        blend_pixel(&mut canvas, -1, 0, [255, 255, 255, 255], 1.0);
        blend_pixel(&mut canvas, 2, 1, [255, 255, 255, 255], 1.0);
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0, 255]));

        blend_pixel(&mut canvas, 1, 1, [255, 255, 255, 255], 1.0);
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn partial_coverage_mixes() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        blend_pixel(&mut canvas, 0, 0, [255, 255, 255, 255], 0.5);
        let v = canvas.get_pixel(0, 0).0[0];
        assert!((120..=135).contains(&v), "got {v}");
    }
}
