//! Interfaces the host widget framework provides to the pack.

use image::RgbaImage;
use vision_canvas::{CanvasPoint, DrawArea, Painter};

/// Role of a widget type registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetRole {
    /// Read-only image display bound to a node output
    Display,
    /// Editable drop target bound to a literal node
    Control,
}

impl WidgetRole {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetRole::Display => "display",
            WidgetRole::Control => "control",
        }
    }
}

/// Drawing context of a host node, extending the annotation primitives with
/// the image panel and the meta text box.
pub trait PanelPainter: Painter {
    /// Draw `image` scaled into `area`, or the placeholder text when there is
    /// no image. Returns whether a bitmap was drawn.
    fn image_panel(&mut self, area: DrawArea, image: Option<&RgbaImage>, placeholder: &str) -> bool;

    /// Draw text lines in a box whose top-left corner is `origin`.
    fn meta_box(&mut self, lines: &[String], origin: CanvasPoint, width: f32);
}

/// Lifecycle callbacks a widget may invoke on its host node.
pub trait WidgetHost {
    /// Request a redraw of the foreground and/or background canvas.
    fn set_dirty_canvas(&mut self, foreground: bool, background: bool);

    /// Ask the host to recompute the node size.
    fn reset_size(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use vision_canvas::{CanvasRect, Color, DashStyle, HandleStyle};

    /// Records host and painter calls for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub dirty: Vec<(bool, bool)>,
        pub resets: usize,
    }

    impl WidgetHost for RecordingHost {
        fn set_dirty_canvas(&mut self, foreground: bool, background: bool) {
            self.dirty.push((foreground, background));
        }

        fn reset_size(&mut self) {
            self.resets += 1;
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum PanelOp {
        Image { area: DrawArea, has_image: bool, placeholder: String },
        Meta { lines: Vec<String>, origin: CanvasPoint, width: f32 },
        Line,
        DashedLine,
        DashedRect(CanvasRect),
        Handle(CanvasPoint),
    }

    #[derive(Debug, Default)]
    pub struct RecordingPanel {
        pub ops: Vec<PanelOp>,
    }

    impl Painter for RecordingPanel {
        fn line(&mut self, _from: CanvasPoint, _to: CanvasPoint, _color: Color, _width: f32) {
            self.ops.push(PanelOp::Line);
        }

        fn dashed_line(&mut self, _from: CanvasPoint, _to: CanvasPoint, _style: &DashStyle, _selected: bool) {
            self.ops.push(PanelOp::DashedLine);
        }

        fn dashed_rect(&mut self, rect: CanvasRect, _style: &DashStyle, _selected: bool) {
            self.ops.push(PanelOp::DashedRect(rect));
        }

        fn handle(&mut self, center: CanvasPoint, _style: &HandleStyle, _selected: bool) {
            self.ops.push(PanelOp::Handle(center));
        }
    }

    impl PanelPainter for RecordingPanel {
        fn image_panel(&mut self, area: DrawArea, image: Option<&RgbaImage>, placeholder: &str) -> bool {
            self.ops.push(PanelOp::Image {
                area,
                has_image: image.is_some(),
                placeholder: placeholder.to_string(),
            });
            image.is_some()
        }

        fn meta_box(&mut self, lines: &[String], origin: CanvasPoint, width: f32) {
            self.ops.push(PanelOp::Meta {
                lines: lines.to_vec(),
                origin,
                width,
            });
        }
    }
}
