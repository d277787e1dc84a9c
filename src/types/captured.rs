//! Captured still image

use std::io::Cursor;

use crate::{ClearbinError, Result};

/// Container format of captured image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// Recognised by the decoder but neither JPEG nor PNG.
    Other,
}

/// One shutter press worth of encoded image bytes.
///
/// The bytes are kept exactly as the camera produced them; the format is
/// sniffed from their magic number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl CapturedImage {
    /// Wrap encoded image bytes, rejecting empty or unrecognisable input.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ClearbinError::Encoding("image is empty".to_string()));
        }
        let format = match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
            Ok(image::ImageFormat::Png) => ImageFormat::Png,
            Ok(_) => ImageFormat::Other,
            Err(e) => {
                return Err(ClearbinError::Encoding(format!(
                    "unrecognised image data: {e}"
                )));
            }
        };
        Ok(Self { bytes, format })
    }

    /// Compress a raw RGBA bitmap to lossless PNG.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let bitmap = image::RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            ClearbinError::Encoding(format!(
                "pixel buffer does not match {width}x{height} RGBA"
            ))
        })?;

        let mut buffer = Cursor::new(Vec::new());
        bitmap
            .write_to(&mut buffer, image::ImageFormat::Png)
            .map_err(|e| ClearbinError::Encoding(e.to_string()))?;

        Ok(Self {
            bytes: buffer.into_inner(),
            format: ImageFormat::Png,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Pixel dimensions, decoding the image to find them.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let decoded = image::load_from_memory(&self.bytes)
            .map_err(|e| ClearbinError::Encoding(e.to_string()))?;
        Ok((decoded.width(), decoded.height()))
    }
}
