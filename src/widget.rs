//! The two widget roles: read-only display and drop-target control.
//!
//! Both wrap an [`ImageDisplay`]. Decoding runs on a [`DecodeWorker`] when
//! one could be spawned and inline otherwise; results are collected on the
//! event thread by [`ImageDisplayWidget::tick`].

use std::sync::Arc;

use vision_canvas::{CanvasPoint, Key, KindRegistry, PointerKind};

use crate::config::{DisplayConfig, PackConfig};
use crate::decode_worker::{DecodeRequest, DecodeResult, DecodeWorker};
use crate::display::{ImageDisplay, LayoutParams, MenuAction, MenuOption};
use crate::host::{PanelPainter, WidgetHost};
use crate::import::{DroppedFile, FileImporter};
use crate::payload::ImagePayload;

/// Read-only image display bound to a node value.
#[derive(Debug)]
pub struct ImageDisplayWidget {
    name: String,
    display: ImageDisplay,
    worker: Option<DecodeWorker>,
    value: Option<ImagePayload>,
    placeholder: String,
    default_size: [f32; 2],
}

impl ImageDisplayWidget {
    /// Create a widget with a background decode thread. Falls back to inline
    /// decoding when the thread cannot be spawned.
    pub fn new(name: impl Into<String>, config: &DisplayConfig, registry: Arc<KindRegistry>) -> Self {
        let mut widget = Self::without_worker(name, config, registry);
        widget.worker = match DecodeWorker::spawn() {
            Ok(worker) => Some(worker),
            Err(e) => {
                log::warn!("Failed to spawn decoder thread, decoding inline: {}", e);
                None
            }
        };
        widget
    }

    /// Create a widget that decodes on the calling thread.
    pub fn without_worker(name: impl Into<String>, config: &DisplayConfig, registry: Arc<KindRegistry>) -> Self {
        Self {
            name: name.into(),
            display: ImageDisplay::new(config.clone(), registry),
            worker: None,
            value: None,
            placeholder: config.placeholder_text.clone(),
            default_size: config.default_size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&ImagePayload> {
        self.value.as_ref()
    }

    pub fn display(&self) -> &ImageDisplay {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut ImageDisplay {
        &mut self.display
    }

    /// Whether decodes are still in flight on the worker.
    pub fn is_loading(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.pending_count() > 0)
    }

    /// Host notification that the bound value changed.
    pub fn on_value_changed(&mut self, value: Option<ImagePayload>, host: &mut dyn WidgetHost) {
        self.value = value.clone();
        match self.display.set_image_data(value) {
            Some(request) => self.dispatch(request, host),
            None => host.set_dirty_canvas(true, true),
        }
    }

    fn dispatch(&mut self, request: DecodeRequest, host: &mut dyn WidgetHost) {
        let request = match self.worker.as_mut() {
            Some(worker) => match worker.submit(request) {
                Ok(()) => return,
                Err(request) => request,
            },
            None => request,
        };
        self.apply(request.run(), host);
    }

    fn apply(&mut self, result: DecodeResult, host: &mut dyn WidgetHost) -> bool {
        let changed = self.display.finish_load(result);
        if changed {
            host.set_dirty_canvas(true, true);
        }
        changed
    }

    /// Apply finished decodes. Call once per host frame; returns `true` when
    /// the shown image changed.
    pub fn tick(&mut self, host: &mut dyn WidgetHost) -> bool {
        let mut changed = false;
        while let Some(result) = self.worker.as_mut().and_then(DecodeWorker::try_recv) {
            changed |= self.apply(result, host);
        }
        changed
    }

    pub fn compute_size(&mut self) -> (f32, f32) {
        self.display.compute_size(self.default_size[0], self.default_size[1])
    }

    pub fn on_mouse(&mut self, kind: PointerKind, canvas: CanvasPoint, host: &mut dyn WidgetHost) -> bool {
        let handled = self.display.on_pointer_event(kind, canvas);
        if handled {
            host.set_dirty_canvas(true, false);
        }
        handled
    }

    pub fn on_mouse_over(&mut self, canvas: CanvasPoint, host: &mut dyn WidgetHost) {
        if self.display.on_hover(canvas) {
            host.set_dirty_canvas(true, false);
        }
    }

    pub fn on_key(&mut self, key: Key, host: &mut dyn WidgetHost) -> bool {
        let handled = self.display.on_key(key);
        if handled {
            host.set_dirty_canvas(true, false);
        }
        handled
    }

    pub fn context_menu_options(&self, canvas: CanvasPoint) -> Vec<MenuOption> {
        self.display.context_menu_options(canvas)
    }

    pub fn apply_menu_action(&mut self, action: &MenuAction, host: &mut dyn WidgetHost) -> bool {
        let changed = self.display.apply_menu_action(action);
        if changed {
            host.set_dirty_canvas(true, false);
        }
        changed
    }

    pub fn draw<P: PanelPainter>(&mut self, painter: &mut P, layout: &LayoutParams) {
        self.display.draw(painter, layout, &self.placeholder);
    }
}

/// Editable image widget that accepts dropped files.
#[derive(Debug)]
pub struct ImageControlWidget {
    inner: ImageDisplayWidget,
    importer: FileImporter,
    /// Size requested while no image is shown
    dropped_size: (f32, f32),
    dropped_image_height: f32,
}

impl ImageControlWidget {
    pub fn new(name: impl Into<String>, config: &PackConfig, registry: Arc<KindRegistry>) -> Self {
        Self::from_inner(ImageDisplayWidget::new(name, &config.display, registry), config)
    }

    pub fn without_worker(name: impl Into<String>, config: &PackConfig, registry: Arc<KindRegistry>) -> Self {
        Self::from_inner(ImageDisplayWidget::without_worker(name, &config.display, registry), config)
    }

    fn from_inner(mut inner: ImageDisplayWidget, config: &PackConfig) -> Self {
        inner.placeholder = config.display.drop_placeholder_text.clone();
        let [w, h] = config.display.default_size;
        Self {
            inner,
            importer: FileImporter::new(),
            dropped_size: (w, h),
            dropped_image_height: config.import.dropped_image_height,
        }
    }

    pub fn widget(&self) -> &ImageDisplayWidget {
        &self.inner
    }

    pub fn widget_mut(&mut self) -> &mut ImageDisplayWidget {
        &mut self.inner
    }

    pub fn value(&self) -> Option<&ImagePayload> {
        self.inner.value()
    }

    pub fn dropped_size(&self) -> (f32, f32) {
        self.dropped_size
    }

    pub fn compute_size(&mut self) -> (f32, f32) {
        let (w, h) = self.dropped_size;
        self.inner.display.compute_size(w, h)
    }

    pub fn on_value_changed(&mut self, value: Option<ImagePayload>, host: &mut dyn WidgetHost) {
        self.inner.on_value_changed(value, host);
    }

    /// Handle a file dropped on the widget.
    ///
    /// Returns `false` for unsupported MIME types, leaving everything as it
    /// was. Supported files return `true` even when decoding fails; the
    /// failure is logged and the current image stays.
    pub fn on_drop_file(&mut self, file: &DroppedFile, host: &mut dyn WidgetHost) -> bool {
        if !FileImporter::is_supported(&file.mime) {
            log::warn!("Unsupported file type: {}", file.mime);
            return false;
        }

        match self.importer.import(file) {
            Ok(payload) => {
                let width = payload.image_info.width as f32;
                let height = payload.image_info.height as f32;
                self.inner.on_value_changed(Some(payload), host);
                self.dropped_size = (self.dropped_image_height * width / height, self.dropped_image_height);
                host.reset_size();
            }
            Err(e) => log::error!("Error processing {}: {}", file.name, e),
        }
        true
    }

    pub fn tick(&mut self, host: &mut dyn WidgetHost) -> bool {
        self.inner.tick(host)
    }

    pub fn on_mouse(&mut self, kind: PointerKind, canvas: CanvasPoint, host: &mut dyn WidgetHost) -> bool {
        self.inner.on_mouse(kind, canvas, host)
    }

    pub fn on_mouse_over(&mut self, canvas: CanvasPoint, host: &mut dyn WidgetHost) {
        self.inner.on_mouse_over(canvas, host);
    }

    pub fn on_key(&mut self, key: Key, host: &mut dyn WidgetHost) -> bool {
        self.inner.on_key(key, host)
    }

    pub fn context_menu_options(&self, canvas: CanvasPoint) -> Vec<MenuOption> {
        self.inner.context_menu_options(canvas)
    }

    pub fn apply_menu_action(&mut self, action: &MenuAction, host: &mut dyn WidgetHost) -> bool {
        self.inner.apply_menu_action(action, host)
    }

    pub fn draw<P: PanelPainter>(&mut self, painter: &mut P, layout: &LayoutParams) {
        self.inner.draw(painter, layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{PanelOp, RecordingHost, RecordingPanel};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn png_file(width: u32, height: u32) -> DroppedFile {
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        DroppedFile::new("drop.png", "image/png", bytes)
    }

    fn control() -> ImageControlWidget {
        ImageControlWidget::without_worker("value", &PackConfig::default(), Arc::new(KindRegistry::new()))
    }

    #[test]
    fn test_drop_supported_file() {
        let mut widget = control();
        let mut host = RecordingHost::default();
        assert_eq!(widget.compute_size(), (100.0, 100.0));

        assert!(widget.on_drop_file(&png_file(40, 20), &mut host));
        assert!(widget.widget().display().has_image());
        assert_eq!(widget.value().unwrap().image_info.width, 40);
        assert_eq!(host.resets, 1);
        assert!(host.dirty.contains(&(true, true)));

        let (w, h) = widget.dropped_size();
        assert!(approx_eq(w, 400.0));
        assert!(approx_eq(h, 200.0));
    }

    #[test]
    fn test_drop_unsupported_type_is_rejected() {
        let mut widget = control();
        let mut host = RecordingHost::default();
        assert!(widget.on_drop_file(&png_file(4, 4), &mut host));

        let gif = DroppedFile::new("anim.gif", "image/gif", b"GIF89a".to_vec());
        assert!(!widget.on_drop_file(&gif, &mut host));
        assert_eq!(widget.value().unwrap().image_info.width, 4);
        assert_eq!(host.resets, 1);
    }

    #[test]
    fn test_drop_corrupt_file_keeps_image() {
        let mut widget = control();
        let mut host = RecordingHost::default();
        widget.on_drop_file(&png_file(4, 4), &mut host);

        let broken = DroppedFile::new("broken.png", "image/png", vec![0x89, 0x50, 0x4E]);
        assert!(widget.on_drop_file(&broken, &mut host));
        assert_eq!(widget.widget().display().bitmap().unwrap().dimensions(), (4, 4));
        assert_eq!(host.resets, 1);
    }

    #[test]
    fn test_control_draws_drop_placeholder() {
        let mut widget = control();
        let mut panel = RecordingPanel::default();
        let layout = LayoutParams {
            available_width: 100.0,
            start_y: 0.0,
            node_height: 100.0,
        };
        widget.draw(&mut panel, &layout);
        assert!(matches!(
            &panel.ops[0],
            PanelOp::Image { placeholder, .. } if placeholder == "Drag image here"
        ));
    }

    #[test]
    fn test_display_widget_with_worker() {
        let mut widget =
            ImageDisplayWidget::new("image", &DisplayConfig::default(), Arc::new(KindRegistry::new()));
        let mut host = RecordingHost::default();
        let payload = FileImporter::new().import(&png_file(6, 3)).unwrap();
        widget.on_value_changed(Some(payload), &mut host);

        let deadline = Instant::now() + Duration::from_secs(10);
        while !widget.tick(&mut host) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(widget.display().has_image());
        assert!(!widget.is_loading());
        assert_eq!(widget.compute_size(), (6.0, 3.0 + 40.0));
    }

    #[test]
    fn test_value_cleared() {
        let mut widget =
            ImageDisplayWidget::without_worker("image", &DisplayConfig::default(), Arc::new(KindRegistry::new()));
        let mut host = RecordingHost::default();
        let payload = FileImporter::new().import(&png_file(2, 2)).unwrap();
        widget.on_value_changed(Some(payload), &mut host);
        assert!(widget.display().has_image());

        widget.on_value_changed(None, &mut host);
        assert!(!widget.display().has_image());
        assert!(widget.value().is_none());
        assert_eq!(widget.compute_size(), (100.0, 100.0));
    }

    #[test]
    fn test_pointer_events_mark_canvas_dirty() {
        let mut widget = control();
        let mut host = RecordingHost::default();
        widget.on_drop_file(&png_file(40, 40), &mut host);

        let mut panel = RecordingPanel::default();
        let layout = LayoutParams {
            available_width: 210.0,
            start_y: 0.0,
            node_height: 251.0,
        };
        widget.draw(&mut panel, &layout);
        host.dirty.clear();

        assert!(widget.apply_menu_action(&MenuAction::StartTool("point".to_string()), &mut host));
        assert!(widget.on_mouse(PointerKind::Down, CanvasPoint::new(50.0, 50.0), &mut host));
        assert_eq!(widget.widget().display().annotations().len(), 1);
        assert!(host.dirty.iter().all(|d| *d == (true, false)));

        assert!(widget.on_key(Key::Escape, &mut host));
    }
}
