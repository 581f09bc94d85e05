//! Conversions between image payloads and RGBA bitmaps.

use image::RgbaImage;
use thiserror::Error;

use crate::payload::{ImageBuffer, ImagePayload, PayloadError, PixelFormat};

/// Errors that can occur while converting images.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Codec failure from the `image` crate
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Channel layout or element size the bitmap conversion cannot handle
    #[error("Unsupported pixel format: {channels} channels, {bits} bit")]
    UnsupportedFormat { channels: u32, bits: u32 },

    /// Pixel data shorter than the dimensions require
    #[error("Truncated pixel data: expected {expected} bytes, got {actual}")]
    TruncatedData { expected: usize, actual: usize },

    /// Dimensions whose byte length does not fit in memory
    #[error("Image too large: {width} x {height}")]
    TooLarge { width: u32, height: u32 },

    #[error("Image has no pixels")]
    EmptyImage,

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Decode a payload into a displayable RGBA bitmap.
pub fn payload_to_rgba(payload: &ImagePayload) -> Result<RgbaImage, ConvertError> {
    let buffer = ImageBuffer::from_payload(payload)?;
    buffer_to_rgba(&buffer)
}

/// Expand a raw buffer to RGBA8.
///
/// Supports 8 and 16 bit channels (16 bit keeps the high byte) with one to
/// four channels: grey, grey+alpha, RGB and RGBA.
pub fn buffer_to_rgba(buffer: &ImageBuffer) -> Result<RgbaImage, ConvertError> {
    let format = buffer.format;
    let channels = format.channel_count as usize;
    if format.float || !matches!(format.bits_per_channel, 8 | 16) || !(1..=4).contains(&channels) {
        return Err(ConvertError::UnsupportedFormat {
            channels: format.channel_count,
            bits: format.bits_per_channel,
        });
    }

    let too_large = || ConvertError::TooLarge {
        width: buffer.width,
        height: buffer.height,
    };
    let expected = buffer.expected_len().ok_or_else(too_large)?;
    let capacity = (buffer.width as usize)
        .checked_mul(buffer.height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(too_large)?;
    if buffer.data.len() < expected {
        return Err(ConvertError::TruncatedData {
            expected,
            actual: buffer.data.len(),
        });
    }

    let bytes_per_channel = format.bytes_per_channel();
    // Little-endian: the high byte of a 16 bit sample is the last one.
    let sample = |pixel: &[u8], channel: usize| pixel[channel * bytes_per_channel + bytes_per_channel - 1];

    let mut rgba = Vec::with_capacity(capacity);
    for pixel in buffer.data[..expected].chunks_exact(format.pixel_stride()) {
        let out = match channels {
            1 => {
                let l = sample(pixel, 0);
                [l, l, l, 255]
            }
            2 => {
                let l = sample(pixel, 0);
                [l, l, l, sample(pixel, 1)]
            }
            3 => [sample(pixel, 0), sample(pixel, 1), sample(pixel, 2), 255],
            _ => [sample(pixel, 0), sample(pixel, 1), sample(pixel, 2), sample(pixel, 3)],
        };
        rgba.extend_from_slice(&out);
    }

    RgbaImage::from_raw(buffer.width, buffer.height, rgba).ok_or(ConvertError::TruncatedData {
        expected,
        actual: buffer.data.len(),
    })
}

/// Reduce an RGBA bitmap to the smallest 8-bit layout that keeps every
/// value: grey when all pixels have R = G = B, plus alpha only when some
/// pixel is not fully opaque.
pub fn rgba_to_payload(image: &RgbaImage) -> Result<ImagePayload, ConvertError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ConvertError::EmptyImage);
    }

    let grey = image.pixels().all(|p| p[0] == p[1] && p[1] == p[2]);
    let alpha = image.pixels().any(|p| p[3] < 255);
    let channels: u32 = match (grey, alpha) {
        (true, false) => 1,
        (true, true) => 2,
        (false, false) => 3,
        (false, true) => 4,
    };

    let mut data = Vec::with_capacity(image.width() as usize * image.height() as usize * channels as usize);
    for p in image.pixels() {
        if grey {
            data.push(p[0]);
        } else {
            data.extend_from_slice(&[p[0], p[1], p[2]]);
        }
        if alpha {
            data.push(p[3]);
        }
    }

    let buffer = ImageBuffer::new(image.width(), image.height(), PixelFormat::u8(channels)?, data)?;
    Ok(ImagePayload::from_buffer(&buffer))
}
