//! Image <-> canvas coordinate mapping.
//!
//! A [`CoordinateMapper`] is a small value built from the *current* draw area
//! and the native image size. Owners rebuild it whenever they need it instead
//! of caching one across layout passes.

use crate::geometry::{CanvasPoint, DrawArea, ImagePoint};

/// Affine mapping between image pixels and a canvas draw area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateMapper {
    area: Option<DrawArea>,
    image_width: u32,
    image_height: u32,
}

impl CoordinateMapper {
    /// Create a mapper for the given draw area and native image size.
    pub fn new(area: Option<DrawArea>, image_width: u32, image_height: u32) -> Self {
        Self {
            area,
            image_width,
            image_height,
        }
    }

    /// A mapper that never converts anything (no layout yet, or no image).
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn area(&self) -> Option<DrawArea> {
        self.area
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Whether conversions can currently produce a result.
    pub fn is_available(&self) -> bool {
        self.usable_area().is_some()
    }

    fn usable_area(&self) -> Option<DrawArea> {
        if self.image_width == 0 || self.image_height == 0 {
            return None;
        }
        self.area.filter(DrawArea::is_valid)
    }

    /// Convert an image position to canvas space.
    ///
    /// `canvas_x = area.x + img_x * area.width / image_width`, same for Y.
    pub fn image_to_canvas(&self, point: ImagePoint) -> Option<CanvasPoint> {
        let area = self.usable_area()?;
        Some(CanvasPoint::new(
            area.x + point.img_x * area.width / self.image_width as f32,
            area.y + point.img_y * area.height / self.image_height as f32,
        ))
    }

    /// Convert a canvas position to an integral image pixel index.
    ///
    /// The scaled position is floored and clamped to `[0, dimension - 1]` on
    /// each axis, so the result is always a valid pixel index even for input
    /// far outside the draw area.
    pub fn canvas_to_image(&self, point: CanvasPoint) -> Option<ImagePoint> {
        let area = self.usable_area()?;
        if point.x.is_nan() || point.y.is_nan() {
            return None;
        }

        let scale_x = self.image_width as f32 / area.width;
        let scale_y = self.image_height as f32 / area.height;
        let max_x = (self.image_width - 1) as f32;
        let max_y = (self.image_height - 1) as f32;

        Some(ImagePoint::new(
            ((point.x - area.x) * scale_x).floor().clamp(0.0, max_x),
            ((point.y - area.y) * scale_y).floor().clamp(0.0, max_y),
        ))
    }
}
