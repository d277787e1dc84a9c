//! Classification request body

use serde::{Deserialize, Serialize};

/// Body POSTed to the detect endpoint.
///
/// Serialises as `{"imgb64": "data:image/jpeg;base64,..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    imgb64: String,
}

impl ClassificationRequest {
    /// Wrap an already encoded data URI.
    pub fn new(data_uri: impl Into<String>) -> Self {
        Self {
            imgb64: data_uri.into(),
        }
    }

    /// The encoded image as sent on the wire.
    pub fn data_uri(&self) -> &str {
        &self.imgb64
    }
}
