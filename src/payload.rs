//! Image payload wire format and the decoded raw pixel buffer.
//!
//! The payload is the JSON value carried by image nodes:
//!
//! ```json
//! {
//!   "imageInfo": {
//!     "nImageSize": 12, "nWidth": 2, "nHeight": 2, "nXPadding": 0, "nYPadding": 0,
//!     "stPixelFormat": {
//!       "bSupported": true, "bSigned": false, "bPlanar": false, "bFloat": false,
//!       "nChannels": 3, "nElementSize": 8, "nTotalSize": 24,
//!       "ePixelEncoding": "TCVN_PE_NONE", "ePixelPackMode": "TCVN_PPM_NONE"
//!     }
//!   },
//!   "imageData": "<base64>"
//! }
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{PIXEL_ENCODING_NONE, PIXEL_PACK_MODE_NONE};

/// Image value as exchanged with the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(rename = "imageInfo", default)]
    pub image_info: ImageInfo,
    /// Base64 of the packed pixel bytes
    #[serde(rename = "imageData", default)]
    pub image_data: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageInfo {
    /// Byte length of the decoded buffer
    #[serde(rename = "nImageSize")]
    pub image_size: u64,
    #[serde(rename = "nWidth")]
    pub width: u32,
    #[serde(rename = "nHeight")]
    pub height: u32,
    #[serde(rename = "nXPadding")]
    pub x_padding: u32,
    #[serde(rename = "nYPadding")]
    pub y_padding: u32,
    #[serde(rename = "stPixelFormat")]
    pub pixel_format: PixelFormatInfo,
}

/// Pixel format block of the payload, kept verbatim for round-tripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelFormatInfo {
    #[serde(rename = "bSupported")]
    pub supported: bool,
    #[serde(rename = "bSigned")]
    pub signed: bool,
    #[serde(rename = "bPlanar")]
    pub planar: bool,
    #[serde(rename = "bFloat")]
    pub float: bool,
    #[serde(rename = "nChannels")]
    pub channels: u32,
    /// Bits per channel
    #[serde(rename = "nElementSize")]
    pub element_size: u32,
    /// Bits per pixel
    #[serde(rename = "nTotalSize")]
    pub total_size: u32,
    #[serde(rename = "ePixelEncoding")]
    pub pixel_encoding: String,
    #[serde(rename = "ePixelPackMode")]
    pub pixel_pack_mode: String,
}

impl Default for PixelFormatInfo {
    fn default() -> Self {
        Self {
            supported: true,
            signed: false,
            planar: false,
            float: false,
            channels: 4,
            element_size: 0,
            total_size: 0,
            pixel_encoding: PIXEL_ENCODING_NONE.to_string(),
            pixel_pack_mode: PIXEL_PACK_MODE_NONE.to_string(),
        }
    }
}

impl ImagePayload {
    /// Whether the payload describes an actual image.
    pub fn has_image(&self) -> bool {
        self.image_info.width > 0 && self.image_info.height > 0 && !self.image_data.is_empty()
    }

    /// Build a payload from a raw buffer, filling in the derived sizes.
    pub fn from_buffer(buffer: &ImageBuffer) -> Self {
        let format = buffer.format;
        Self {
            image_info: ImageInfo {
                image_size: buffer.data.len() as u64,
                width: buffer.width,
                height: buffer.height,
                x_padding: 0,
                y_padding: 0,
                pixel_format: PixelFormatInfo {
                    supported: true,
                    signed: format.signed,
                    planar: false,
                    float: format.float,
                    channels: format.channel_count,
                    element_size: format.bits_per_channel,
                    total_size: format.channel_count * format.bits_per_channel,
                    pixel_encoding: PIXEL_ENCODING_NONE.to_string(),
                    pixel_pack_mode: PIXEL_PACK_MODE_NONE.to_string(),
                },
            },
            image_data: STANDARD.encode(&buffer.data),
        }
    }
}

/// Errors turning a payload into an [`ImageBuffer`].
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid image dimensions {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("Unsupported element size: {bits} bit")]
    UnsupportedElementSize { bits: u32 },

    #[error("Pixel format has no channels")]
    ZeroChannels,
}

/// Numeric type of one channel sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl SampleKind {
    /// Size of one sample in bytes.
    pub fn size(&self) -> usize {
        match self {
            SampleKind::U8 | SampleKind::I8 => 1,
            SampleKind::U16 | SampleKind::I16 => 2,
            SampleKind::U32 | SampleKind::I32 | SampleKind::F32 => 4,
            SampleKind::F64 => 8,
        }
    }

    /// Read one little-endian sample. `None` if `bytes` has the wrong length.
    pub fn read(&self, bytes: &[u8]) -> Option<f64> {
        let value = match self {
            SampleKind::U8 => f64::from(u8::from_le_bytes(bytes.try_into().ok()?)),
            SampleKind::U16 => f64::from(u16::from_le_bytes(bytes.try_into().ok()?)),
            SampleKind::U32 => f64::from(u32::from_le_bytes(bytes.try_into().ok()?)),
            SampleKind::I8 => f64::from(i8::from_le_bytes(bytes.try_into().ok()?)),
            SampleKind::I16 => f64::from(i16::from_le_bytes(bytes.try_into().ok()?)),
            SampleKind::I32 => f64::from(i32::from_le_bytes(bytes.try_into().ok()?)),
            SampleKind::F32 => f64::from(f32::from_le_bytes(bytes.try_into().ok()?)),
            SampleKind::F64 => f64::from_le_bytes(bytes.try_into().ok()?),
        };
        Some(value)
    }
}

/// Channel layout of a raw buffer. Channels are always byte aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub channel_count: u32,
    /// One of 8, 16, 32, 64
    pub bits_per_channel: u32,
    pub signed: bool,
    pub float: bool,
}

impl PixelFormat {
    pub fn new(channel_count: u32, bits_per_channel: u32, signed: bool, float: bool) -> Result<Self, PayloadError> {
        if channel_count == 0 {
            return Err(PayloadError::ZeroChannels);
        }
        if !matches!(bits_per_channel, 8 | 16 | 32 | 64) {
            return Err(PayloadError::UnsupportedElementSize { bits: bits_per_channel });
        }
        Ok(Self {
            channel_count,
            bits_per_channel,
            signed,
            float,
        })
    }

    /// Unsigned 8-bit with `channel_count` channels.
    pub fn u8(channel_count: u32) -> Result<Self, PayloadError> {
        Self::new(channel_count, 8, false, false)
    }

    pub fn from_info(info: &PixelFormatInfo) -> Result<Self, PayloadError> {
        Self::new(info.channels, info.element_size, info.signed, info.float)
    }

    pub fn bytes_per_channel(&self) -> usize {
        (self.bits_per_channel / 8) as usize
    }

    /// Bytes per pixel. Saturates instead of overflowing; callers bound it
    /// against the data length.
    pub fn pixel_stride(&self) -> usize {
        (self.channel_count as usize).saturating_mul(self.bytes_per_channel())
    }

    /// Sample type for this format. Float wins over signed; 64-bit
    /// integers and 8/16-bit floats have no sample type.
    pub fn sample_kind(&self) -> Option<SampleKind> {
        match (self.float, self.signed, self.bits_per_channel) {
            (true, _, 32) => Some(SampleKind::F32),
            (true, _, 64) => Some(SampleKind::F64),
            (true, _, _) => None,
            (false, true, 8) => Some(SampleKind::I8),
            (false, true, 16) => Some(SampleKind::I16),
            (false, true, 32) => Some(SampleKind::I32),
            (false, false, 8) => Some(SampleKind::U8),
            (false, false, 16) => Some(SampleKind::U16),
            (false, false, 32) => Some(SampleKind::U32),
            _ => None,
        }
    }
}

/// Decoded raw pixels. Immutable once built; a new image replaces it.
///
/// `data` is not checked against the dimensions so a truncated payload can
/// still be probed; readers bound every access.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self, PayloadError> {
        if width == 0 || height == 0 {
            return Err(PayloadError::ZeroDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Decode the base64 pixel data of a payload.
    pub fn from_payload(payload: &ImagePayload) -> Result<Self, PayloadError> {
        let info = &payload.image_info;
        let format = PixelFormat::from_info(&info.pixel_format)?;
        let data = STANDARD.decode(payload.image_data.as_bytes())?;
        Self::new(info.width, info.height, format, data)
    }

    /// Bytes per row, `None` if it does not fit in `usize`.
    pub fn row_stride(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.format.pixel_stride())
    }

    /// Byte length implied by the dimensions and format, `None` on overflow.
    pub fn expected_len(&self) -> Option<usize> {
        (self.height as usize).checked_mul(self.row_stride()?)
    }

    pub fn is_complete(&self) -> bool {
        self.expected_len().is_some_and(|len| self.data.len() >= len)
    }
}
