//! Camera sources.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::types::FlashMode;
use crate::{ClearbinError, Result};

/// A device (or stand-in) that produces one encoded still per call.
///
/// Failures are reported as [`ClearbinError::Capture`].
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Source name for logging/debugging.
    fn name(&self) -> &str;

    /// Take one picture with the given flash setting, returning encoded bytes.
    async fn capture(&self, flash: FlashMode) -> Result<Vec<u8>>;
}

/// Camera that "captures" by reading a still image from disk.
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CameraSource for FileCamera {
    fn name(&self) -> &str {
        "file"
    }

    async fn capture(&self, flash: FlashMode) -> Result<Vec<u8>> {
        if flash.is_on() {
            tracing::debug!(path = %self.path.display(), "flash has no effect on file camera");
        }
        tokio::fs::read(&self.path).await.map_err(|e| {
            ClearbinError::Capture(format!("failed to read {}: {e}", self.path.display()))
        })
    }
}
