//! Input events delivered by the host widget.

use crate::geometry::{CanvasPoint, ImagePoint};

/// Pointer event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer position in both coordinate systems.
///
/// `canvas` is already clamped to the draw area; `image` is its integral
/// pixel index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub canvas: CanvasPoint,
    pub image: ImagePoint,
}

impl PointerPosition {
    pub fn new(canvas: CanvasPoint, image: ImagePoint) -> Self {
        Self { canvas, image }
    }
}

/// Keys the display reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Char(char),
    Other,
}
