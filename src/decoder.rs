//! On-demand pixel lookup in a raw image buffer.

use std::sync::Arc;

use crate::payload::{ImageBuffer, ImagePayload};

/// Reads channel values of single pixels from the current [`ImageBuffer`].
///
/// Every query is bounds checked against the declared dimensions and the
/// actual data length; anything that does not fit yields `None`.
#[derive(Debug, Clone, Default)]
pub struct PixelDecoder {
    buffer: Option<Arc<ImageBuffer>>,
}

impl PixelDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the decoded source.
    pub fn update(&mut self, buffer: Arc<ImageBuffer>) {
        self.buffer = Some(buffer);
    }

    /// Replace the source from a payload. A payload that cannot be decoded
    /// leaves the decoder empty.
    pub fn update_from_payload(&mut self, payload: &ImagePayload) {
        self.buffer = match ImageBuffer::from_payload(payload) {
            Ok(buffer) => Some(Arc::new(buffer)),
            Err(e) => {
                log::debug!("Pixel decoder has no data: {}", e);
                None
            }
        };
    }

    pub fn clear(&mut self) {
        self.buffer = None;
    }

    pub fn is_valid(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Option<&ImageBuffer> {
        self.buffer.as_deref()
    }

    /// Channel values at pixel `(x, y)`.
    ///
    /// Returns `None` without a buffer, outside `[0, width) x [0, height)`,
    /// when the pixel extends past the end of the data, or when the format
    /// has no sample type.
    pub fn get_pixel(&self, x: i64, y: i64) -> Option<Vec<f64>> {
        let buffer = self.buffer.as_deref()?;
        if x < 0 || y < 0 || x >= i64::from(buffer.width) || y >= i64::from(buffer.height) {
            return None;
        }

        let kind = buffer.format.sample_kind()?;
        let pixel_stride = buffer.format.pixel_stride();
        let offset = (y as usize)
            .checked_mul(buffer.row_stride()?)?
            .checked_add((x as usize).checked_mul(pixel_stride)?)?;
        let end = offset.checked_add(pixel_stride)?;
        let bytes = buffer.data.get(offset..end)?;

        bytes.chunks_exact(kind.size()).map(|sample| kind.read(sample)).collect()
    }
}
