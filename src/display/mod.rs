//! Image display component shared by both widget roles.
//!
//! [`ImageDisplay`] owns everything one widget shows: the decoded bitmap, the
//! raw payload and its [`PixelDecoder`], the annotation list and the
//! [`InteractionManager`] editing it. The draw area is recomputed on every
//! draw and a fresh [`CoordinateMapper`] is built from it whenever pointer
//! events need image coordinates.
//!
//! Image loads are two-phase: [`ImageDisplay::set_image_data`] hands out a
//! [`DecodeRequest`] tagged with a new [`LoadToken`], and
//! [`ImageDisplay::finish_load`] applies a result only if its token is still
//! the latest one.

pub mod menu;
pub mod meta;

use std::sync::Arc;

use image::RgbaImage;
use vision_canvas::annotation::list_to_json;
use vision_canvas::{
    Annotation, AnnotationError, AnnotationTheme, Callback, CanvasPoint, CoordinateMapper, DrawArea, InteractionManager,
    Key, KindRegistry, PointerKind, PointerPosition, Selection, Shape, ToolState,
};

use crate::config::DisplayConfig;
use crate::constants::META_LINE_COUNT;
use crate::decode_worker::{DecodeRequest, DecodeResult, LoadToken};
use crate::decoder::PixelDecoder;
use crate::host::PanelPainter;
use crate::payload::ImagePayload;

pub use menu::{MenuAction, MenuOption};

/// Messages produced by the interaction layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// A tool emitted a new annotation
    AnnotationFinished(Annotation),
}

/// Layout inputs from the host node for one draw pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Width available to the widget
    pub available_width: f32,
    /// Y where the widget starts inside the node
    pub start_y: f32,
    /// Current node height
    pub node_height: f32,
}

/// What pointer events can change on screen, compared before and after an
/// event to decide whether a redraw is needed.
#[derive(Debug, PartialEq)]
struct EditState {
    selection: Selection,
    tool: Option<(ToolState, Option<PointerPosition>)>,
    selected_shape: Option<Shape>,
    count: usize,
}

/// Image, pixel readout and annotations of one widget.
#[derive(Debug)]
pub struct ImageDisplay {
    config: DisplayConfig,
    registry: Arc<KindRegistry>,

    bitmap: Option<RgbaImage>,
    raw: ImagePayload,
    /// Payload of the latest load token, applied or still decoding
    latest: Option<ImagePayload>,
    decoder: PixelDecoder,
    token: LoadToken,

    draw_area: Option<DrawArea>,
    hover: Option<PointerPosition>,
    cached_size: Option<(f32, f32)>,

    annotations: Vec<Annotation>,
    interaction: InteractionManager<DisplayEvent>,
}

impl ImageDisplay {
    pub fn new(config: DisplayConfig, registry: Arc<KindRegistry>) -> Self {
        Self::with_theme(config, registry, AnnotationTheme::DEFAULT)
    }

    pub fn with_theme(config: DisplayConfig, registry: Arc<KindRegistry>, theme: AnnotationTheme) -> Self {
        Self {
            config,
            registry,
            bitmap: None,
            raw: ImagePayload::default(),
            latest: None,
            decoder: PixelDecoder::new(),
            token: LoadToken::default(),
            draw_area: None,
            hover: None,
            cached_size: None,
            annotations: Vec::new(),
            interaction: InteractionManager::new(theme),
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// Whether a decoded image is currently shown.
    pub fn has_image(&self) -> bool {
        self.bitmap.is_some()
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    /// Payload of the image currently shown (the empty payload without one).
    pub fn image_data(&self) -> &ImagePayload {
        &self.raw
    }

    pub fn decoder(&self) -> &PixelDecoder {
        &self.decoder
    }

    /// Latest issued load token.
    pub fn token(&self) -> LoadToken {
        self.token
    }

    pub fn draw_area(&self) -> Option<DrawArea> {
        self.draw_area
    }

    pub fn hover(&self) -> Option<PointerPosition> {
        self.hover
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn interaction(&self) -> &InteractionManager<DisplayEvent> {
        &self.interaction
    }

    // =========================================================================
    // Image loading
    // =========================================================================

    /// Start showing a new value.
    ///
    /// Returns the decode request to run, or `None` when nothing needs
    /// decoding: the value is cleared or equals the latest requested payload.
    /// Clearing also issues a new token so pending decodes are discarded.
    pub fn set_image_data(&mut self, value: Option<ImagePayload>) -> Option<DecodeRequest> {
        self.cached_size = None;

        let Some(payload) = value.filter(ImagePayload::has_image) else {
            self.token = self.token.next();
            self.latest = None;
            self.clear_image();
            log::debug!("Image cleared (load {})", self.token.0);
            return None;
        };

        if self.latest.as_ref() == Some(&payload) {
            log::debug!("Image unchanged, no decode needed");
            return None;
        }

        self.token = self.token.next();
        self.latest = Some(payload.clone());
        log::debug!(
            "Decode requested for load {} ({}x{})",
            self.token.0,
            payload.image_info.width,
            payload.image_info.height
        );
        Some(DecodeRequest {
            token: self.token,
            payload,
        })
    }

    /// Apply a finished decode. Returns `true` when the displayed image changed.
    ///
    /// Results with an outdated token are dropped silently. Codec failures are
    /// logged and leave the current image and annotations untouched.
    pub fn finish_load(&mut self, result: DecodeResult) -> bool {
        if result.token != self.token {
            log::debug!("Discarding stale decode {} (latest is {})", result.token.0, self.token.0);
            return false;
        }

        match result.outcome {
            Ok(decoded) => {
                let Some(payload) = self.latest.clone() else {
                    return false;
                };
                log::debug!("Applied decode {}", result.token.0);
                self.bitmap = Some(decoded.bitmap);
                self.raw = payload;
                self.decoder.update(decoded.buffer);
                self.cached_size = None;
                self.hover = None;
                true
            }
            Err(e) => {
                log::error!("Failed to decode image: {}", e);
                // Allow the same value to be retried.
                self.latest = None;
                false
            }
        }
    }

    /// Decode on the calling thread and apply the result.
    pub fn set_image_data_blocking(&mut self, value: Option<ImagePayload>) -> bool {
        match self.set_image_data(value) {
            Some(request) => self.finish_load(request.run()),
            None => false,
        }
    }

    fn clear_image(&mut self) {
        self.bitmap = None;
        self.raw = ImagePayload::default();
        self.decoder.clear();
        self.hover = None;
        self.cached_size = None;
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn meta_height(&self) -> f32 {
        self.config.meta_height(META_LINE_COUNT)
    }

    /// Preferred widget size.
    ///
    /// `(width, height)` is passed through while no image is shown. With an
    /// image, the size cached by the last draw wins, else the native image
    /// size plus the meta box.
    pub fn compute_size(&mut self, width: f32, height: f32) -> (f32, f32) {
        let Some(bitmap) = &self.bitmap else {
            return (width, height);
        };
        if let Some(size) = self.cached_size {
            return size;
        }
        let size = (bitmap.width() as f32, bitmap.height() as f32 + self.meta_height());
        self.cached_size = Some(size);
        size
    }

    /// Mapper for the current draw area and image.
    pub fn mapper(&self) -> CoordinateMapper {
        if self.bitmap.is_none() {
            return CoordinateMapper::unavailable();
        }
        CoordinateMapper::new(self.draw_area, self.raw.image_info.width, self.raw.image_info.height)
    }

    /// Clamp a canvas position into the draw area and map it to image space.
    fn to_position(&self, canvas: CanvasPoint) -> Option<PointerPosition> {
        let area = self.draw_area?;
        let clamped = area.clamp(canvas);
        let image = self.mapper().canvas_to_image(clamped)?;
        Some(PointerPosition::new(clamped, image))
    }

    /// The two meta lines: image format and hovered pixel.
    pub fn meta_text(&self) -> [String; META_LINE_COUNT] {
        let hover = self.hover.map(|pos| {
            let values = self
                .decoder
                .get_pixel(pos.image.img_x as i64, pos.image.img_y as i64);
            (pos.image.img_x, pos.image.img_y, values)
        });
        meta::meta_lines(&self.raw.image_info, hover)
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn edit_state(&self) -> EditState {
        let selection = self.interaction.selection();
        EditState {
            selection,
            tool: self.interaction.tool().map(|t| (t.state().clone(), t.hover())),
            selected_shape: selection
                .index()
                .and_then(|i| self.annotations.get(i))
                .map(|a| *a.shape()),
            count: self.annotations.len(),
        }
    }

    /// Route a pointer event. Returns `true` when the selection, the tool
    /// state or the annotation list changed and the canvas needs a redraw.
    pub fn on_pointer_event(&mut self, kind: PointerKind, canvas: CanvasPoint) -> bool {
        let Some(pos) = self.to_position(canvas) else {
            return false;
        };
        let mapper = self.mapper();
        log::trace!("{:?} at canvas {:?} -> image {:?}", kind, pos.canvas, pos.image);

        let before = self.edit_state();
        let event = match kind {
            PointerKind::Down => self.interaction.pointer_down(pos, &mut self.annotations, &mapper),
            PointerKind::Move => self.interaction.pointer_move(pos, &mut self.annotations, &mapper),
            PointerKind::Up => self.interaction.pointer_up(pos),
        };

        if let Some(DisplayEvent::AnnotationFinished(annotation)) = event {
            log::info!("Created {} annotation", annotation.kind());
            self.annotations.push(annotation);
        }
        self.edit_state() != before
    }

    /// Track the hovered pixel. Positions outside the draw area clear it.
    /// Returns `true` when the hover state changed.
    pub fn on_hover(&mut self, canvas: CanvasPoint) -> bool {
        let inside = self.draw_area.is_some_and(|area| area.contains(&canvas));
        let hover = if inside { self.to_position(canvas) } else { None };
        if hover == self.hover {
            return false;
        }
        self.hover = hover;
        self.interaction.hover(hover);
        true
    }

    /// Keyboard shortcuts. Returns `true` when the key was consumed.
    pub fn on_key(&mut self, key: Key) -> bool {
        match key {
            Key::Escape => {
                self.cancel();
                true
            }
            Key::Delete | Key::Backspace => self.delete_selected().is_some(),
            _ => false,
        }
    }

    // =========================================================================
    // Annotation editing
    // =========================================================================

    /// Activate the creation tool for `tag`. Requires a displayed image.
    pub fn start_tool(&mut self, tag: &str) -> bool {
        if !self.has_image() {
            log::debug!("No image, ignoring tool '{}'", tag);
            return false;
        }
        let Some(tool) = self
            .registry
            .create_tool(tag, Callback::new(DisplayEvent::AnnotationFinished))
        else {
            log::warn!("Unknown annotation kind '{}'", tag);
            return false;
        };
        self.interaction.set_tool(tool, &mut self.annotations);
        self.interaction.hover(self.hover);
        true
    }

    /// Cancel the active tool and clear the selection.
    pub fn cancel(&mut self) {
        self.interaction.cancel(&mut self.annotations);
    }

    pub fn delete_selected(&mut self) -> Option<Annotation> {
        self.interaction.remove_selected(&mut self.annotations)
    }

    pub fn clear_annotations(&mut self) {
        if !self.annotations.is_empty() {
            log::info!("Cleared {} annotations", self.annotations.len());
        }
        self.annotations.clear();
        self.interaction.forget_annotations();
    }

    pub fn serialize_annotations(&self) -> Result<String, AnnotationError> {
        list_to_json(&self.annotations)
    }

    /// Replace the annotation list from JSON. Entries of unknown kinds are
    /// skipped; returns the number loaded.
    pub fn load_annotations(&mut self, json: &str) -> Result<usize, AnnotationError> {
        let loaded = self.registry.load_json(json)?;
        self.interaction.cancel(&mut self.annotations);
        self.annotations = loaded;
        self.interaction.forget_annotations();
        log::info!("Loaded {} annotations", self.annotations.len());
        Ok(self.annotations.len())
    }

    // =========================================================================
    // Context menu
    // =========================================================================

    /// Context menu entries for a click at `canvas`.
    ///
    /// "Add" entries are enabled only over a displayed image.
    pub fn context_menu_options(&self, canvas: CanvasPoint) -> Vec<MenuOption> {
        let over_image = self.has_image() && self.draw_area.is_some_and(|area| area.contains(&canvas));

        let mut options: Vec<MenuOption> = self
            .registry
            .kinds()
            .into_iter()
            .map(|kind| {
                MenuOption::new(
                    format!("Add {}", kind.display_name()),
                    MenuAction::StartTool(kind.tag().to_string()),
                )
                .enabled_if(over_image)
            })
            .collect();

        if self.interaction.is_tool_active() {
            options.push(MenuOption::new("Cancel", MenuAction::Cancel));
        }
        if self.interaction.selection().index().is_some() {
            options.push(MenuOption::new("Delete annotation", MenuAction::DeleteSelected));
        }
        if !self.annotations.is_empty() {
            options.push(MenuOption::new("Clear annotations", MenuAction::ClearAnnotations));
        }
        options
    }

    /// Perform a menu action. Returns `true` when anything changed.
    pub fn apply_menu_action(&mut self, action: &MenuAction) -> bool {
        log::debug!("Menu action {:?}", action);
        match action {
            MenuAction::StartTool(tag) => self.start_tool(tag),
            MenuAction::Cancel => {
                let active = self.interaction.is_tool_active();
                self.cancel();
                active
            }
            MenuAction::DeleteSelected => self.delete_selected().is_some(),
            MenuAction::ClearAnnotations => {
                let had_any = !self.annotations.is_empty();
                self.clear_annotations();
                had_any
            }
        }
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Lay out and draw image panel, meta box, annotations and tool preview.
    pub fn draw<P: PanelPainter>(&mut self, painter: &mut P, layout: &LayoutParams, placeholder: &str) {
        let lines = self.meta_text();
        let meta_height = self.config.meta_height(lines.len());

        let margin = self.config.margin;
        let width = layout.available_width - 2.0 * margin;
        let image_y = layout.start_y + self.config.image_top_padding;
        let image_height = layout.node_height - 2.0 * margin - layout.start_y - meta_height;

        let area = DrawArea::new(margin, image_y, width, image_height);
        self.draw_area = Some(area);

        if !painter.image_panel(area, self.bitmap.as_ref(), placeholder) {
            return;
        }

        painter.meta_box(
            &lines,
            CanvasPoint::new(margin + 6.0, image_y + image_height + margin + 6.0),
            width - 12.0,
        );

        let mapper = self.mapper();
        let theme = self.interaction.theme();
        for annotation in &self.annotations {
            annotation.draw(painter, &mapper, theme, false);
        }
        self.interaction.draw_tool(painter, &mapper);

        self.cached_size = Some((
            layout.available_width,
            2.0 * margin + image_height + meta_height + image_y,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_worker::decode_payload;
    use crate::host::testing::{PanelOp, RecordingPanel};
    use crate::payload::{ImageBuffer, PixelFormat};
    use vision_canvas::registry::{LINE, POINT, RECTANGLE};
    use vision_canvas::ImagePoint;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn grey_payload(width: u32, height: u32) -> ImagePayload {
        let data = (0..width * height).map(|i| (i % 256) as u8).collect();
        let buffer = ImageBuffer::new(width, height, PixelFormat::u8(1).unwrap(), data).unwrap();
        ImagePayload::from_buffer(&buffer)
    }

    fn display() -> ImageDisplay {
        ImageDisplay::new(DisplayConfig::default(), Arc::new(KindRegistry::new()))
    }

    /// 40x40 image in a 200x200 area at the origin: canvas = 5 * image.
    fn display_with_image() -> ImageDisplay {
        let mut d = display();
        assert!(d.set_image_data_blocking(Some(grey_payload(40, 40))));
        d.draw_area = Some(DrawArea::new(0.0, 0.0, 200.0, 200.0));
        d
    }

    fn click(d: &mut ImageDisplay, x: f32, y: f32) {
        d.on_pointer_event(PointerKind::Down, CanvasPoint::new(x, y));
        d.on_pointer_event(PointerKind::Up, CanvasPoint::new(x, y));
    }

    #[test]
    fn test_point_creation_scenario() {
        let mut d = display_with_image();
        assert!(d.start_tool(POINT));
        d.on_pointer_event(PointerKind::Down, CanvasPoint::new(50.0, 50.0));

        assert_eq!(d.annotations().len(), 1);
        assert_eq!(
            *d.annotations()[0].shape(),
            Shape::Point {
                coord: ImagePoint::new(10.0, 10.0)
            }
        );
        assert!(!d.interaction().is_tool_active());
    }

    #[test]
    fn test_line_drag_creates_line() {
        let mut d = display_with_image();
        assert!(d.start_tool(LINE));
        d.on_pointer_event(PointerKind::Down, CanvasPoint::new(10.0, 10.0));
        d.on_pointer_event(PointerKind::Move, CanvasPoint::new(60.0, 30.0));
        assert!(d.annotations().is_empty());
        d.on_pointer_event(PointerKind::Up, CanvasPoint::new(100.0, 50.0));

        assert_eq!(d.annotations().len(), 1);
        assert_eq!(
            *d.annotations()[0].shape(),
            Shape::Line {
                start: ImagePoint::new(2.0, 2.0),
                end: ImagePoint::new(20.0, 10.0)
            }
        );
    }

    #[test]
    fn test_pointer_outside_area_is_clamped() {
        let mut d = display_with_image();
        assert!(d.start_tool(POINT));
        d.on_pointer_event(PointerKind::Down, CanvasPoint::new(500.0, -30.0));
        assert_eq!(
            *d.annotations()[0].shape(),
            Shape::Point {
                coord: ImagePoint::new(39.0, 0.0)
            }
        );
    }

    #[test]
    fn test_tools_need_an_image() {
        let mut d = display();
        assert!(!d.start_tool(POINT));
        assert!(!d.on_pointer_event(PointerKind::Down, CanvasPoint::new(1.0, 1.0)));

        let mut d = display_with_image();
        assert!(!d.start_tool("no-such-kind"));
    }

    #[test]
    fn test_pointer_events_report_changes_only() {
        let mut d = display_with_image();
        assert!(!d.on_pointer_event(PointerKind::Move, CanvasPoint::new(20.0, 20.0)));
        assert!(!d.on_pointer_event(PointerKind::Down, CanvasPoint::new(20.0, 20.0)));

        d.start_tool(POINT);
        assert!(d.on_pointer_event(PointerKind::Down, CanvasPoint::new(50.0, 50.0)));
        assert!(!d.on_pointer_event(PointerKind::Up, CanvasPoint::new(50.0, 50.0)));

        assert!(d.on_pointer_event(PointerKind::Down, CanvasPoint::new(50.0, 50.0)));
        assert!(!d.on_pointer_event(PointerKind::Down, CanvasPoint::new(50.0, 50.0)));
        assert!(d.on_pointer_event(PointerKind::Move, CanvasPoint::new(80.0, 80.0)));
        assert!(!d.on_pointer_event(PointerKind::Move, CanvasPoint::new(80.0, 80.0)));
        assert!(d.on_pointer_event(PointerKind::Up, CanvasPoint::new(80.0, 80.0)));
        assert!(!d.on_pointer_event(PointerKind::Move, CanvasPoint::new(150.0, 150.0)));
    }

    #[test]
    fn test_select_and_delete_with_keys() {
        let mut d = display_with_image();
        d.start_tool(POINT);
        click(&mut d, 50.0, 50.0);
        d.start_tool(POINT);
        click(&mut d, 150.0, 150.0);
        assert_eq!(d.annotations().len(), 2);

        click(&mut d, 51.0, 51.0);
        assert_eq!(d.interaction().selection().index(), Some(0));
        assert!(d.annotations()[0].selected);

        assert!(d.on_key(Key::Delete));
        assert_eq!(d.annotations().len(), 1);
        assert!(!d.on_key(Key::Backspace));
        assert!(!d.on_key(Key::Char('x')));
    }

    #[test]
    fn test_escape_cancels_tool_and_selection() {
        let mut d = display_with_image();
        d.start_tool(RECTANGLE);
        d.on_pointer_event(PointerKind::Down, CanvasPoint::new(10.0, 10.0));
        assert!(d.on_key(Key::Escape));
        assert!(!d.interaction().is_tool_active());
        assert!(d.annotations().is_empty());

        d.start_tool(POINT);
        click(&mut d, 50.0, 50.0);
        click(&mut d, 50.0, 50.0);
        assert!(d.annotations()[0].selected);
        d.on_key(Key::Escape);
        assert!(!d.annotations()[0].selected);
        assert_eq!(d.interaction().selection(), Selection::None);
    }

    #[test]
    fn test_stale_async_load_is_discarded() {
        let mut d = display();
        let a = grey_payload(4, 4);
        let b = grey_payload(8, 2);

        let request_a = d.set_image_data(Some(a)).unwrap();
        let request_b = d.set_image_data(Some(b.clone())).unwrap();
        assert_eq!(request_a.token, LoadToken(1));
        assert_eq!(request_b.token, LoadToken(2));

        assert!(d.finish_load(request_b.run()));
        assert!(!d.finish_load(request_a.run()));

        assert_eq!(d.bitmap().unwrap().dimensions(), (8, 2));
        assert_eq!(*d.image_data(), b);
    }

    #[test]
    fn test_clear_supersedes_pending_load() {
        let mut d = display();
        let request = d.set_image_data(Some(grey_payload(4, 4))).unwrap();
        assert!(d.set_image_data(None).is_none());
        assert!(!d.finish_load(request.run()));
        assert!(!d.has_image());
        assert_eq!(*d.image_data(), ImagePayload::default());
    }

    #[test]
    fn test_same_payload_is_not_decoded_twice() {
        let mut d = display();
        let payload = grey_payload(4, 4);
        assert!(d.set_image_data_blocking(Some(payload.clone())));
        assert!(d.set_image_data(Some(payload)).is_none());
        assert_eq!(d.token(), LoadToken(1));
    }

    #[test]
    fn test_codec_failure_keeps_current_state() {
        let mut d = display_with_image();
        d.start_tool(POINT);
        click(&mut d, 50.0, 50.0);

        let mut broken = grey_payload(2, 2);
        broken.image_info.pixel_format.element_size = 12;
        let request = d.set_image_data(Some(broken.clone())).unwrap();
        assert!(decode_payload(&request.payload).is_err());
        assert!(!d.finish_load(request.run()));

        assert_eq!(d.bitmap().unwrap().dimensions(), (40, 40));
        assert_eq!(d.annotations().len(), 1);
        // A failed value can be requested again.
        assert!(d.set_image_data(Some(broken)).is_some());
    }

    #[test]
    fn test_compute_size() {
        let mut d = display();
        assert_eq!(d.compute_size(100.0, 80.0), (100.0, 80.0));

        d.set_image_data_blocking(Some(grey_payload(30, 20)));
        let (w, h) = d.compute_size(100.0, 80.0);
        assert!(approx_eq(w, 30.0));
        assert!(approx_eq(h, 20.0 + 2.0 * 16.0 + 8.0));

        let mut panel = RecordingPanel::default();
        let layout = LayoutParams {
            available_width: 300.0,
            start_y: 10.0,
            node_height: 250.0,
        };
        d.draw(&mut panel, &layout, "No image");
        let (w, h) = d.compute_size(100.0, 80.0);
        assert!(approx_eq(w, 300.0));
        // 2 * 5 + (250 - 10 - 10 - 40) + 40 + 11
        assert!(approx_eq(h, 251.0));
    }

    #[test]
    fn test_draw_layout() {
        let mut d = display();
        d.set_image_data_blocking(Some(grey_payload(10, 10)));
        let mut panel = RecordingPanel::default();
        let layout = LayoutParams {
            available_width: 210.0,
            start_y: 20.0,
            node_height: 300.0,
        };
        d.draw(&mut panel, &layout, "No image");

        let area = d.draw_area().unwrap();
        assert!(approx_eq(area.x, 5.0));
        assert!(approx_eq(area.y, 21.0));
        assert!(approx_eq(area.width, 200.0));
        assert!(approx_eq(area.height, 300.0 - 10.0 - 20.0 - 40.0));

        match &panel.ops[1] {
            PanelOp::Meta { lines, origin, width } => {
                assert_eq!(lines[0], "10 x 10 px  1 ch  8 bit");
                assert!(approx_eq(origin.x, 11.0));
                assert!(approx_eq(origin.y, 21.0 + 230.0 + 5.0 + 6.0));
                assert!(approx_eq(*width, 188.0));
            }
            other => panic!("expected meta box, got {other:?}"),
        }
    }

    #[test]
    fn test_draw_without_image_stops_after_placeholder() {
        let mut d = display();
        let mut panel = RecordingPanel::default();
        let layout = LayoutParams {
            available_width: 100.0,
            start_y: 0.0,
            node_height: 100.0,
        };
        d.draw(&mut panel, &layout, "Drag image here");
        assert_eq!(panel.ops.len(), 1);
        assert!(matches!(
            &panel.ops[0],
            PanelOp::Image { has_image: false, placeholder, .. } if placeholder == "Drag image here"
        ));
        assert_eq!(d.compute_size(100.0, 100.0), (100.0, 100.0));
    }

    #[test]
    fn test_draw_annotations_and_ghost_handle() {
        let mut d = display_with_image();
        d.start_tool(RECTANGLE);
        click(&mut d, 0.0, 0.0);
        d.start_tool(POINT);
        d.on_hover(CanvasPoint::new(20.0, 20.0));

        let mut panel = RecordingPanel::default();
        let layout = LayoutParams {
            available_width: 210.0,
            start_y: 0.0,
            node_height: 251.0,
        };
        d.draw(&mut panel, &layout, "No image");
        assert!(panel.ops.iter().any(|op| matches!(op, PanelOp::DashedRect(_))));
        assert!(matches!(panel.ops.last(), Some(PanelOp::Handle(_))));
    }

    #[test]
    fn test_hover_meta_line() {
        let mut d = display_with_image();
        assert!(d.on_hover(CanvasPoint::new(12.0, 7.0)));
        let hover = d.hover().unwrap();
        assert_eq!(hover.image, ImagePoint::new(2.0, 1.0));
        // Pixel (2, 1) of a 40 wide ramp is 42.
        assert_eq!(d.meta_text()[1], "+   2,   1 L 42");

        assert!(!d.on_hover(CanvasPoint::new(12.0, 7.0)));
        assert!(d.on_hover(CanvasPoint::new(-5.0, 7.0)));
        assert_eq!(d.meta_text()[1], "  ");
    }

    #[test]
    fn test_context_menu() {
        let mut d = display();
        let options = d.context_menu_options(CanvasPoint::new(10.0, 10.0));
        assert_eq!(options.len(), d.registry().len());
        assert!(options.iter().all(|o| !o.enabled));
        assert_eq!(options[0].label, "Add Point");

        let mut d = display_with_image();
        let inside = CanvasPoint::new(10.0, 10.0);
        assert!(d.context_menu_options(inside).iter().all(|o| o.enabled));

        assert!(d.apply_menu_action(&MenuAction::StartTool(POINT.to_string())));
        let options = d.context_menu_options(inside);
        assert_eq!(options.last().unwrap().action, MenuAction::Cancel);
        assert!(d.apply_menu_action(&MenuAction::Cancel));
        assert!(!d.apply_menu_action(&MenuAction::Cancel));

        d.start_tool(POINT);
        click(&mut d, 50.0, 50.0);
        click(&mut d, 50.0, 50.0);
        let actions: Vec<MenuAction> = d.context_menu_options(inside).into_iter().map(|o| o.action).collect();
        assert!(actions.ends_with(&[MenuAction::DeleteSelected, MenuAction::ClearAnnotations]));

        assert!(d.apply_menu_action(&MenuAction::ClearAnnotations));
        assert!(d.annotations().is_empty());
        assert_eq!(d.interaction().selection(), Selection::None);
    }

    #[test]
    fn test_annotations_json_round_trip() {
        let mut d = display_with_image();
        d.start_tool(POINT);
        click(&mut d, 50.0, 50.0);
        d.start_tool(LINE);
        d.on_pointer_event(PointerKind::Down, CanvasPoint::new(0.0, 0.0));
        d.on_pointer_event(PointerKind::Up, CanvasPoint::new(100.0, 100.0));
        let json = d.serialize_annotations().unwrap();

        let mut other = display();
        assert_eq!(other.load_annotations(&json).unwrap(), 2);
        assert_eq!(other.annotations(), d.annotations());
    }

    #[test]
    fn test_load_skips_unknown_kinds() {
        let mut d = display();
        let json = r#"[
            {"kind": "point", "coord": {"imgX": 1, "imgY": 2}},
            {"kind": "polygon", "coord": {"imgX": 1, "imgY": 2}},
            {"type": "rectangle", "start": {"imgX": 0, "imgY": 0}, "end": {"imgX": 3, "imgY": 4}}
        ]"#;
        assert_eq!(d.load_annotations(json).unwrap(), 2);
        assert!(d.load_annotations("not json").is_err());
        assert_eq!(d.annotations().len(), 2);
    }
}
