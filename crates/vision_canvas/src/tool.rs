//! Annotation creation tools.
//!
//! A [`ShapeTool`] turns one pointer gesture into one finished annotation.
//! Point tools finish on pointer-down; line and rectangle tools capture from
//! pointer-down to pointer-up while updating a live preview.

use crate::annotation::{Annotation, Geometry, Shape};
use crate::callback::Callback;
use crate::event::PointerPosition;
use crate::mapping::CoordinateMapper;
use crate::paint::Painter;
use crate::theme::AnnotationTheme;

/// Capture state of a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolState {
    Idle,
    /// The anchor is fixed; `preview` follows the pointer.
    Capturing { preview: Annotation },
}

/// Result of feeding a pointer event to a tool.
#[derive(Debug)]
pub enum ToolOutcome<M> {
    Continue,
    /// The tool emitted its annotation through the completion callback.
    Finished(Option<M>),
}

impl<M> ToolOutcome<M> {
    pub fn is_finished(&self) -> bool {
        matches!(self, ToolOutcome::Finished(_))
    }
}

/// Creation tool for one annotation kind.
#[derive(Debug)]
pub struct ShapeTool<M> {
    kind: String,
    geometry: Geometry,
    state: ToolState,
    hover: Option<PointerPosition>,
    on_finish: Callback<Annotation, M>,
}

impl<M> ShapeTool<M> {
    pub fn new(kind: impl Into<String>, geometry: Geometry, on_finish: Callback<Annotation, M>) -> Self {
        Self {
            kind: kind.into(),
            geometry,
            state: ToolState::Idle,
            hover: None,
            on_finish,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, ToolState::Capturing { .. })
    }

    /// The in-progress annotation, if capturing.
    pub fn preview(&self) -> Option<&Annotation> {
        match &self.state {
            ToolState::Capturing { preview } => Some(preview),
            ToolState::Idle => None,
        }
    }

    pub fn hover(&self) -> Option<PointerPosition> {
        self.hover
    }

    pub fn pointer_down(&mut self, pos: PointerPosition) -> ToolOutcome<M> {
        let shape = Shape::degenerate(self.geometry, pos.image);
        let annotation = Annotation::new(self.kind.clone(), shape);

        if self.geometry == Geometry::Point {
            return self.finish(annotation);
        }

        log::trace!("{} tool: capture started at {:?}", self.kind, pos.image);
        self.state = ToolState::Capturing { preview: annotation };
        ToolOutcome::Continue
    }

    pub fn pointer_move(&mut self, pos: PointerPosition) -> ToolOutcome<M> {
        self.hover = Some(pos);
        if let ToolState::Capturing { preview } = &mut self.state {
            preview.set_end(pos.image);
        }
        ToolOutcome::Continue
    }

    pub fn pointer_up(&mut self, pos: PointerPosition) -> ToolOutcome<M> {
        match std::mem::replace(&mut self.state, ToolState::Idle) {
            ToolState::Capturing { mut preview } => {
                preview.set_end(pos.image);
                self.finish(preview)
            }
            ToolState::Idle => ToolOutcome::Continue,
        }
    }

    /// Track the hover position for the ghost handle. Visual only.
    pub fn set_hover(&mut self, pos: Option<PointerPosition>) {
        self.hover = pos;
    }

    /// Discard any preview and return to idle without emitting.
    pub fn cancel(&mut self) {
        if self.is_capturing() {
            log::debug!("{} tool: capture cancelled", self.kind);
        }
        self.state = ToolState::Idle;
        self.hover = None;
    }

    fn finish(&mut self, annotation: Annotation) -> ToolOutcome<M> {
        log::debug!("{} tool: finished {:?}", self.kind, annotation.shape());
        self.state = ToolState::Idle;
        self.hover = None;
        ToolOutcome::Finished(self.on_finish.call(annotation))
    }

    /// Draw the live preview with its handles, or a ghost handle at the
    /// hover position while idle.
    pub fn draw(&self, painter: &mut dyn Painter, mapper: &CoordinateMapper, theme: &AnnotationTheme) {
        match &self.state {
            ToolState::Capturing { preview } => preview.draw(painter, mapper, theme, true),
            ToolState::Idle => {
                if let Some(hover) = self.hover {
                    painter.handle(hover.canvas, self.geometry.handle_style(theme), false);
                }
            }
        }
    }
}
