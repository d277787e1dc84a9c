//! Capture controller.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::camera::CameraSource;
use crate::config::Config;
use crate::encoder::ImageEncoder;
use crate::telemetry;
use crate::types::{CapturedImage, ClassificationRequest, FlashMode};
use crate::{ClearbinError, Result};

/// Owns the camera and the flash setting, and writes each capture to a
/// single temp path that the result screen reads back.
pub struct CaptureController<C> {
    camera: C,
    flash: FlashMode,
    temp_path: PathBuf,
    encoder: ImageEncoder,
}

impl<C: CameraSource> CaptureController<C> {
    pub fn new(camera: C, temp_path: impl Into<PathBuf>) -> Self {
        Self {
            camera,
            flash: FlashMode::default(),
            temp_path: temp_path.into(),
            encoder: ImageEncoder::default(),
        }
    }

    pub fn from_config(camera: C, config: &Config) -> Self {
        Self::new(camera, config.capture.temp_image_path())
            .with_encoder(ImageEncoder::with_media_type(&config.client.media_type))
    }

    pub fn with_encoder(mut self, encoder: ImageEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn flash_mode(&self) -> FlashMode {
        self.flash
    }

    pub fn set_flash_mode(&mut self, flash: FlashMode) {
        self.flash = flash;
    }

    /// Flip the flash setting, returning the new mode.
    pub fn toggle_flash(&mut self) -> FlashMode {
        self.flash = self.flash.toggled();
        debug!(flash = ?self.flash, "flash toggled");
        self.flash
    }

    /// Where the latest capture is stored.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn encoder(&self) -> &ImageEncoder {
        &self.encoder
    }

    /// Take a picture and persist it to the temp path, replacing any
    /// previous capture.
    pub async fn capture_image(&self) -> Result<CapturedImage> {
        let bytes = self.camera.capture(self.flash).await?;
        if bytes.is_empty() {
            return Err(ClearbinError::Capture(format!(
                "camera `{}` returned no data",
                self.camera.name()
            )));
        }

        let image = CapturedImage::from_bytes(bytes)?;
        self.persist(&image).await?;
        metrics::counter!(telemetry::CAPTURES_TOTAL).increment(1);

        info!(
            camera = self.camera.name(),
            path = %self.temp_path.display(),
            bytes = image.bytes().len(),
            "image captured"
        );
        Ok(image)
    }

    /// Encode a captured image into a request body.
    pub fn encode(&self, image: &CapturedImage) -> Result<ClassificationRequest> {
        Ok(ClassificationRequest::new(self.encoder.encode(image)?))
    }

    /// Capture, persist and encode in one step.
    pub async fn capture(&self) -> Result<ClassificationRequest> {
        let image = self.capture_image().await?;
        self.encode(&image)
    }

    async fn persist(&self, image: &CapturedImage) -> Result<()> {
        if let Some(parent) = self.temp_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.temp_path, image.bytes()).await?;
        Ok(())
    }
}
