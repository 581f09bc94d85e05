//! Vision Pack - image widgets for node graph editors.
//!
//! Shows `ITcVnImage` payloads in graph nodes with a live pixel readout and
//! point, line and rectangle annotations. Annotation interaction lives in the
//! `vision_canvas` crate; this crate adds the payload format, pixel decoding,
//! codecs, background decoding and the widgets that tie it together.

pub mod config;
pub mod constants;
pub mod convert;
pub mod decode_worker;
pub mod decoder;
pub mod display;
pub mod host;
pub mod import;
pub mod pack;
pub mod payload;
pub mod widget;

pub use config::{ConfigError, LogLevel, PackConfig};
pub use convert::ConvertError;
pub use decode_worker::{DecodeRequest, DecodeResult, DecodeWorker, LoadToken};
pub use decoder::PixelDecoder;
pub use display::{DisplayEvent, ImageDisplay, LayoutParams, MenuAction, MenuOption};
pub use host::{PanelPainter, WidgetHost, WidgetRole};
pub use import::{DroppedFile, FileImporter, ImportError};
pub use pack::{PackRegistrar, VisionPack};
pub use payload::{ImageBuffer, ImagePayload, PayloadError, PixelFormat};
pub use widget::{ImageControlWidget, ImageDisplayWidget};

pub use vision_canvas;
