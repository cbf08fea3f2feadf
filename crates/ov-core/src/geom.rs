//! Coordinate spaces.
//!
//! Pointer events arrive in viewport space (page client coordinates).
//! Labels are stored in image-local space: origin at the top-left corner
//! of the image container. Both the on-screen render and the exported
//! raster use image-local space, so all conversions go through
//! [`CoordinateMapper`].

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Largest side, in pixels, a surface may be rasterized at.
pub const MAX_SURFACE_SIDE: u32 = 16384;

/// Pixel dimensions of the image container (the composition surface).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
        }
    }
}

impl Surface {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whole-pixel dimensions for rasterization, `None` when either side
    /// rounds to zero, is not finite, or exceeds [`MAX_SURFACE_SIDE`].
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return None;
        }
        let w = self.width.round();
        let h = self.height.round();
        let max = MAX_SURFACE_SIDE as f64;
        if w < 1.0 || h < 1.0 || w > max || h > max {
            return None;
        }
        Some((w as u32, h as u32))
    }

    /// Whether either side is too large to rasterize.
    pub fn is_oversized(&self) -> bool {
        let max = MAX_SURFACE_SIDE as f64 + 0.5;
        self.width >= max || self.height >= max
    }

    /// The surface placed at `origin` in viewport space.
    pub fn at(&self, origin: Point) -> Rect {
        Rect::from_origin_size(origin, self.size())
    }
}

/// Viewport ↔ image-local conversion.
///
/// Stateless: the container's current viewport rect is passed on every call,
/// since it moves with scrolling and resizing.
pub struct CoordinateMapper;

impl CoordinateMapper {
    /// Map a viewport pointer position into image-local coordinates.
    ///
    /// No clamping: a pointer outside the container yields coordinates
    /// outside `[0, width] × [0, height]`.
    pub fn to_image_local(pointer: Point, container: Rect) -> Point {
        Point::new(pointer.x - container.x0, pointer.y - container.y0)
    }

    /// Map an image-local position back into viewport coordinates.
    pub fn to_viewport(local: Point, container: Rect) -> Point {
        Point::new(local.x + container.x0, local.y + container.y0)
    }

    /// Whether an image-local point falls inside the surface.
    pub fn contains(local: Point, surface: Surface) -> bool {
        local.x >= 0.0 && local.y >= 0.0 && local.x <= surface.width && local.y <= surface.height
    }
}
