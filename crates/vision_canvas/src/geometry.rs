//! Image-space and canvas-space geometry primitives.
//!
//! Annotations store [`ImagePoint`]s only. Everything on screen is a
//! [`CanvasPoint`] derived through the [`crate::CoordinateMapper`] at the
//! moment it is needed.

use serde::{Deserialize, Serialize};

/// A position in native image pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    #[serde(rename = "imgX")]
    pub img_x: f32,
    #[serde(rename = "imgY")]
    pub img_y: f32,
}

impl ImagePoint {
    pub fn new(img_x: f32, img_y: f32) -> Self {
        Self { img_x, img_y }
    }
}

/// A position on the host canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point.
    pub fn distance_squared_to(&self, other: &CanvasPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &CanvasPoint) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Check whether `other` lies inside the axis-aligned square of half-size
    /// `half_extent` centred on this point (exclusive bounds).
    pub fn within_box(&self, other: &CanvasPoint, half_extent: f32) -> bool {
        (self.x - other.x).abs() < half_extent && (self.y - other.y).abs() < half_extent
    }

    /// Distance from this point to the segment `a`-`b`.
    ///
    /// Returns `None` for a degenerate segment (`a == b`), where the
    /// projection parameter is undefined.
    pub fn distance_to_segment(&self, a: &CanvasPoint, b: &CanvasPoint) -> Option<f32> {
        let length_squared = a.distance_squared_to(b);
        if length_squared == 0.0 {
            return None;
        }

        let t = ((self.x - a.x) * (b.x - a.x) + (self.y - a.y) * (b.y - a.y)) / length_squared;
        let t = t.clamp(0.0, 1.0);
        let closest = CanvasPoint::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
        Some(self.distance_to(&closest))
    }
}

/// The screen rectangle currently allocated to render the image.
///
/// Recomputed on every layout pass by the owning display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DrawArea {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A draw area can only be used for coordinate conversion when it has a
    /// positive, finite extent.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the area (inclusive bounds).
    pub fn contains(&self, point: &CanvasPoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Clamp a point onto the area.
    pub fn clamp(&self, point: CanvasPoint) -> CanvasPoint {
        CanvasPoint::new(
            point.x.max(self.x).min(self.right()),
            point.y.max(self.y).min(self.bottom()),
        )
    }
}

/// Axis-aligned rectangle in canvas space with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub min: CanvasPoint,
    pub max: CanvasPoint,
}

impl CanvasRect {
    /// Create a normalized rectangle from two opposite corners in any order.
    pub fn from_corners(a: CanvasPoint, b: CanvasPoint) -> Self {
        Self {
            min: CanvasPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: CanvasPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn top_left(&self) -> CanvasPoint {
        self.min
    }

    pub fn top_right(&self) -> CanvasPoint {
        CanvasPoint::new(self.max.x, self.min.y)
    }

    pub fn bottom_left(&self) -> CanvasPoint {
        CanvasPoint::new(self.min.x, self.max.y)
    }

    pub fn bottom_right(&self) -> CanvasPoint {
        self.max
    }

    /// Check if a point is inside the rectangle (inclusive bounds).
    pub fn contains(&self, point: &CanvasPoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}
