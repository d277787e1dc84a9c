//! Classifier trait.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::types::{ClassificationRequest, ClassificationResult};

/// Something that turns an encoded image into a verdict.
///
/// Implementations must stop work and return `Cancelled` once `cancel`
/// fires; a session relies on this to drop results for a closed screen.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    async fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> Result<ClassificationResult>;
}
