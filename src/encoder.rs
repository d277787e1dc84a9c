//! Data URI encoding for captured images.
//!
//! The detect service expects the image embedded as
//! `data:<media type>;base64,<payload>`. The media type is only a label: the
//! service sniffs the real format itself, so the default `image/jpeg` label
//! is sent even for PNG bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::types::CapturedImage;
use crate::{ClearbinError, Result};

/// Media type label placed in the data URI by default.
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Turns captured images into base64 data URIs.
#[derive(Debug, Clone)]
pub struct ImageEncoder {
    prefix: String,
}

impl Default for ImageEncoder {
    fn default() -> Self {
        Self::with_media_type(DEFAULT_MEDIA_TYPE)
    }
}

impl ImageEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different media type label in the data URI prefix.
    pub fn with_media_type(media_type: &str) -> Self {
        Self {
            prefix: format!("data:{media_type};base64,"),
        }
    }

    /// The fixed marker every encoded string starts with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Encode an image as `<prefix><base64 bytes>`.
    pub fn encode(&self, image: &CapturedImage) -> Result<String> {
        let bytes = image.bytes();
        if bytes.is_empty() {
            return Err(ClearbinError::Encoding("image is empty".to_string()));
        }

        let mut encoded = String::with_capacity(self.prefix.len() + bytes.len().div_ceil(3) * 4);
        encoded.push_str(&self.prefix);
        STANDARD.encode_string(bytes, &mut encoded);

        tracing::debug!(
            format = ?image.format(),
            raw_bytes = bytes.len(),
            encoded_len = encoded.len(),
            "encoded image"
        );
        Ok(encoded)
    }
}

/// Decode the payload of a `data:<type>;base64,<payload>` URI.
///
/// A bare base64 string without the `data:` header is accepted too.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = match uri.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                ClearbinError::Encoding("data URI has no payload separator".to_string())
            })?;
            if !header.ends_with(";base64") {
                return Err(ClearbinError::Encoding(format!(
                    "data URI is not base64 encoded: {header}"
                )));
            }
            payload
        }
        None => uri,
    };

    STANDARD
        .decode(payload.trim())
        .map_err(|e| ClearbinError::Encoding(format!("invalid base64 payload: {e}")))
}
