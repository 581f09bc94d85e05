//! Pointer routing between the active tool and annotation editing.
//!
//! The manager is either in tool mode (a [`ShapeTool`] receives every pointer
//! event) or in select mode, where pointer-down selects and possibly grabs a
//! handle of an existing annotation. The annotation list itself is owned by
//! the caller and passed in per call.

use crate::annotation::{Annotation, Handle};
use crate::event::PointerPosition;
use crate::mapping::CoordinateMapper;
use crate::paint::Painter;
use crate::theme::AnnotationTheme;
use crate::tool::{ShapeTool, ToolOutcome};

/// Selection sub-state while no tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Selected {
        index: usize,
    },
    Dragging {
        index: usize,
        handle: Handle,
    },
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        match *self {
            Selection::None => None,
            Selection::Selected { index } | Selection::Dragging { index, .. } => Some(index),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Selection::Dragging { .. })
    }
}

/// Routes pointer events to the active tool or to selection editing.
#[derive(Debug)]
pub struct InteractionManager<M> {
    tool: Option<ShapeTool<M>>,
    selection: Selection,
    theme: AnnotationTheme,
}

impl<M> InteractionManager<M> {
    pub fn new(theme: AnnotationTheme) -> Self {
        Self {
            tool: None,
            selection: Selection::None,
            theme,
        }
    }

    pub fn theme(&self) -> &AnnotationTheme {
        &self.theme
    }

    pub fn tool(&self) -> Option<&ShapeTool<M>> {
        self.tool.as_ref()
    }

    pub fn is_tool_active(&self) -> bool {
        self.tool.is_some()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Activate a tool. Any selection is cleared.
    pub fn set_tool(&mut self, tool: ShapeTool<M>, annotations: &mut [Annotation]) {
        log::debug!("Tool '{}' activated", tool.kind());
        self.clear_selection(annotations);
        self.tool = Some(tool);
    }

    /// Drop the active tool without emitting anything.
    pub fn clear_tool(&mut self) {
        if let Some(tool) = self.tool.take() {
            log::debug!("Tool '{}' cleared", tool.kind());
        }
    }

    fn route(&mut self, outcome: ToolOutcome<M>) -> Option<M> {
        match outcome {
            ToolOutcome::Continue => None,
            ToolOutcome::Finished(message) => {
                self.clear_tool();
                message
            }
        }
    }

    fn clear_selection(&mut self, annotations: &mut [Annotation]) {
        for annotation in annotations.iter_mut() {
            annotation.selected = false;
        }
        self.selection = Selection::None;
    }

    pub fn pointer_down(
        &mut self,
        pos: PointerPosition,
        annotations: &mut [Annotation],
        mapper: &CoordinateMapper,
    ) -> Option<M> {
        if let Some(tool) = self.tool.as_mut() {
            let outcome = tool.pointer_down(pos);
            return self.route(outcome);
        }

        log::trace!("Select pointer down at {:?}", pos.canvas);
        let theme = &self.theme;

        // Topmost (last drawn) first; within one annotation a handle wins
        // over the body.
        let hit = annotations.iter().enumerate().rev().find_map(|(index, a)| {
            if let Some(handle) = a.hit_test_handle(pos.canvas, mapper, theme) {
                Some(Selection::Dragging { index, handle })
            } else if a.hit_test(pos.canvas, mapper, theme) {
                Some(Selection::Selected { index })
            } else {
                None
            }
        });

        self.clear_selection(annotations);
        match hit {
            Some(selection) => {
                if let Some(index) = selection.index() {
                    annotations[index].selected = true;
                }
                log::debug!("Selection: {:?}", selection);
                self.selection = selection;
            }
            None => log::debug!("No annotation at pointer, deselected all"),
        }
        None
    }

    pub fn pointer_move(
        &mut self,
        pos: PointerPosition,
        annotations: &mut [Annotation],
        mapper: &CoordinateMapper,
    ) -> Option<M> {
        if let Some(tool) = self.tool.as_mut() {
            let outcome = tool.pointer_move(pos);
            return self.route(outcome);
        }

        if let Selection::Dragging { index, handle } = self.selection {
            let Some(annotation) = annotations.get_mut(index) else {
                self.selection = Selection::None;
                return None;
            };
            if let Some(to) = mapper.canvas_to_image(pos.canvas) {
                annotation.move_handle(handle, to);
            }
        }
        None
    }

    /// End a tool gesture, or release a grabbed handle. Releasing never
    /// moves the handle; only pointer moves do.
    pub fn pointer_up(&mut self, pos: PointerPosition) -> Option<M> {
        if let Some(tool) = self.tool.as_mut() {
            let outcome = tool.pointer_up(pos);
            return self.route(outcome);
        }

        if let Selection::Dragging { index, handle } = self.selection {
            log::debug!("Released handle {} of annotation {}", handle, index);
            self.selection = Selection::Selected { index };
        }
        None
    }

    /// Forward the hover position to the active tool.
    pub fn hover(&mut self, pos: Option<PointerPosition>) {
        if let Some(tool) = self.tool.as_mut() {
            tool.set_hover(pos);
        }
    }

    /// Cancel the active tool, or clear the selection if there is none.
    /// Calling it with nothing active is a no-op.
    pub fn cancel(&mut self, annotations: &mut [Annotation]) {
        if let Some(mut tool) = self.tool.take() {
            tool.cancel();
            log::debug!("Tool '{}' cancelled", tool.kind());
        }
        if self.selection != Selection::None {
            log::debug!("Selection cleared");
        }
        self.clear_selection(annotations);
    }

    /// Remove the selected annotation from the list.
    pub fn remove_selected(&mut self, annotations: &mut Vec<Annotation>) -> Option<Annotation> {
        let index = self.selection.index()?;
        self.selection = Selection::None;
        if index >= annotations.len() {
            return None;
        }
        let removed = annotations.remove(index);
        log::info!("Deleted {} annotation", removed.kind());
        Some(removed)
    }

    /// Reset selection after the caller replaced or cleared its list.
    pub fn forget_annotations(&mut self) {
        self.selection = Selection::None;
    }

    /// Draw the active tool's preview or ghost handle.
    pub fn draw_tool(&self, painter: &mut dyn Painter, mapper: &CoordinateMapper) {
        if let Some(tool) = &self.tool {
            tool.draw(painter, mapper, &self.theme);
        }
    }
}

impl<M> Default for InteractionManager<M> {
    fn default() -> Self {
        Self::new(AnnotationTheme::default())
    }
}
