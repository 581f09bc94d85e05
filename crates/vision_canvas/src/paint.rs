//! Drawing abstraction.
//!
//! Annotations describe themselves in canvas coordinates through this trait;
//! the host backend decides how each primitive is rasterized.

use crate::geometry::{CanvasPoint, CanvasRect};
use crate::theme::{Color, DashStyle, HandleStyle};

/// Primitive drawing operations used by annotations and tools.
pub trait Painter {
    /// Solid line.
    fn line(&mut self, from: CanvasPoint, to: CanvasPoint, color: Color, width: f32);

    /// Two-pass dashed line (background stroke, dashed foreground on top).
    fn dashed_line(&mut self, from: CanvasPoint, to: CanvasPoint, style: &DashStyle, selected: bool);

    /// Two-pass dashed rectangle outline.
    fn dashed_rect(&mut self, rect: CanvasRect, style: &DashStyle, selected: bool);

    /// Filled and stroked handle square centred on `center`.
    fn handle(&mut self, center: CanvasPoint, style: &HandleStyle, selected: bool);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// One recorded call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Line(CanvasPoint, CanvasPoint),
        DashedLine(CanvasPoint, CanvasPoint, bool),
        DashedRect(CanvasRect, bool),
        Handle(CanvasPoint, bool),
    }

    /// Painter test double that records every call.
    #[derive(Debug, Default)]
    pub struct RecordingPainter {
        pub ops: Vec<Op>,
    }

    impl RecordingPainter {
        pub fn handles(&self) -> Vec<CanvasPoint> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Handle(p, _) => Some(*p),
                    _ => None,
                })
                .collect()
        }
    }

    impl Painter for RecordingPainter {
        fn line(&mut self, from: CanvasPoint, to: CanvasPoint, _color: Color, _width: f32) {
            self.ops.push(Op::Line(from, to));
        }

        fn dashed_line(&mut self, from: CanvasPoint, to: CanvasPoint, _style: &DashStyle, selected: bool) {
            self.ops.push(Op::DashedLine(from, to, selected));
        }

        fn dashed_rect(&mut self, rect: CanvasRect, _style: &DashStyle, selected: bool) {
            self.ops.push(Op::DashedRect(rect, selected));
        }

        fn handle(&mut self, center: CanvasPoint, _style: &HandleStyle, selected: bool) {
            self.ops.push(Op::Handle(center, selected));
        }
    }
}
