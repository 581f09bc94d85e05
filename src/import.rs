//! File import for dropped images.
//!
//! Supported formats are decoded with the `image` crate and reduced to a
//! payload with [`rgba_to_payload`]. Unsupported MIME types are rejected
//! before any decoding happens.

use std::path::Path;

use image::ImageFormat;
use thiserror::Error;

use crate::convert::{ConvertError, rgba_to_payload};
use crate::payload::ImagePayload;

/// One supported file type.
struct FileHandler {
    mime: &'static str,
    format: ImageFormat,
    extensions: &'static [&'static str],
}

const HANDLERS: [FileHandler; 4] = [
    FileHandler {
        mime: "image/jpeg",
        format: ImageFormat::Jpeg,
        extensions: &["jpg", "jpeg"],
    },
    FileHandler {
        mime: "image/png",
        format: ImageFormat::Png,
        extensions: &["png"],
    },
    FileHandler {
        mime: "image/bmp",
        format: ImageFormat::Bmp,
        extensions: &["bmp"],
    },
    FileHandler {
        mime: "image/tiff",
        format: ImageFormat::Tiff,
        extensions: &["tiff", "tif"],
    },
];

/// Errors that can occur while importing a file.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported file type: {mime}")]
    UnsupportedType { mime: String },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to convert image: {0}")]
    Convert(#[from] ConvertError),
}

impl ImportError {
    pub fn unsupported_type(mime: impl Into<String>) -> Self {
        Self::UnsupportedType { mime: mime.into() }
    }
}

/// A file handed over by the host's drag-and-drop plumbing.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedFile {
    pub name: String,
    /// MIME type reported by the host; may be empty
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, deriving the MIME type from its extension and
    /// falling back to its content.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileImporter::mime_for_extension)
            .or_else(|| FileImporter::sniff_mime(&bytes))
            .unwrap_or_default();
        Ok(Self::new(name, mime, bytes))
    }
}

/// Converts dropped image files into payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImporter;

impl FileImporter {
    pub fn new() -> Self {
        Self
    }

    /// All MIME types accepted by [`FileImporter::import`].
    pub fn supported_mime_types() -> impl Iterator<Item = &'static str> {
        HANDLERS.iter().map(|h| h.mime)
    }

    pub fn is_supported(mime: &str) -> bool {
        HANDLERS.iter().any(|h| h.mime == mime)
    }

    /// MIME type for a file extension (case-insensitive, without dot).
    pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
        let ext = ext.to_ascii_lowercase();
        HANDLERS
            .iter()
            .find(|h| h.extensions.iter().any(|e| *e == ext))
            .map(|h| h.mime)
    }

    /// MIME type detected from magic bytes.
    pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("image/png");
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }

        // BMP: 42 4D (BM)
        if data.starts_with(&[0x42, 0x4D]) {
            return Some("image/bmp");
        }

        // TIFF: 49 49 2A 00 (little endian) or 4D 4D 00 2A (big endian)
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
            return Some("image/tiff");
        }

        None
    }

    /// Decode a dropped file into a payload.
    pub fn import(&self, file: &DroppedFile) -> Result<ImagePayload, ImportError> {
        let handler = HANDLERS
            .iter()
            .find(|h| h.mime == file.mime)
            .ok_or_else(|| ImportError::unsupported_type(&file.mime))?;

        let image = image::load_from_memory_with_format(&file.bytes, handler.format)
            .map_err(ConvertError::from)?
            .to_rgba8();
        let payload = rgba_to_payload(&image)?;

        log::info!(
            "Imported {} ({}): {}x{}, {} channels",
            file.name,
            file.mime,
            payload.image_info.width,
            payload.image_info.height,
            payload.image_info.pixel_format.channels
        );
        Ok(payload)
    }

    /// Read and import a file from disk.
    pub fn import_path(&self, path: &Path) -> Result<ImagePayload, ImportError> {
        self.import(&DroppedFile::from_path(path)?)
    }
}
