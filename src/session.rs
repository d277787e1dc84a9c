//! Per-screen classification flow.
//!
//! One capture cycle moves through
//! `Idle → Capturing → Encoding → Requesting → {ShowMatch | ShowNoMatch | Failed}`
//! and back to `Idle` when the user returns to the capture screen.
//!
//! The request runs on a single background task. The session owns the
//! cancellation token handed to the classifier; dropping the session cancels
//! it, and a result that arrives afterwards is discarded. The progress
//! indicator is dismissed exactly once per request on every path.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capture::{CameraSource, CaptureController};
use crate::error::ErrorCategory;
use crate::providers::ImageClassifier;
use crate::router::route;
use crate::types::{ClassificationRequest, ClassificationResult, DisplayState, PresentationChoice};
use crate::{ClearbinError, Result};

/// Label shown on the progress indicator while a request is in flight.
pub const PROGRESS_LABEL: &str = "Please wait...";

/// Something the user sees while the classification runs.
pub trait ProgressIndicator: Send + Sync {
    fn show(&self, label: &str);
    fn dismiss(&self);
}

/// Indicator that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn show(&self, _label: &str) {}
    fn dismiss(&self) {}
}

/// Where the capture cycle currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Capturing,
    Encoding,
    Requesting,
    ShowMatch(DisplayState),
    ShowNoMatch,
    Failed { message: String, retryable: bool },
}

impl FlowState {
    /// Whether the cycle has ended and waits for [`ClassificationSession::reset`].
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ShowMatch(_) | Self::ShowNoMatch | Self::Failed { .. }
        )
    }
}

/// What the presentation layer should do once a cycle ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Open the chosen result sheet.
    Presented(PresentationChoice),
    /// Show an error, offering a retry when `retryable` is set.
    Failed {
        category: ErrorCategory,
        message: String,
        retryable: bool,
    },
    /// The cycle was cancelled; nothing to show.
    Discarded,
}

/// Dismisses the indicator when dropped, so every exit path of the
/// background task (including abort) dismisses exactly once.
struct DismissOnDrop(Arc<dyn ProgressIndicator>);

impl Drop for DismissOnDrop {
    fn drop(&mut self) {
        self.0.dismiss();
    }
}

/// Drives one screen's capture cycles against a classifier.
pub struct ClassificationSession {
    classifier: Arc<dyn ImageClassifier>,
    progress: Arc<dyn ProgressIndicator>,
    state: FlowState,
    cancel: CancellationToken,
    pending: Option<JoinHandle<Result<ClassificationResult>>>,
}

impl ClassificationSession {
    pub fn new(classifier: Arc<dyn ImageClassifier>, progress: Arc<dyn ProgressIndicator>) -> Self {
        Self {
            classifier,
            progress,
            state: FlowState::Idle,
            cancel: CancellationToken::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Whether a request is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Spawn the classification of `request` on a background task.
    ///
    /// Only one request may be in flight; starting while busy or before
    /// [`reset`](Self::reset) after a finished cycle is an error.
    pub fn start(&mut self, request: ClassificationRequest) -> Result<()> {
        match self.state {
            FlowState::Idle | FlowState::Encoding => {}
            ref other => {
                return Err(ClearbinError::InvalidState(format!(
                    "cannot start a classification while {other:?}"
                )));
            }
        }

        self.state = FlowState::Requesting;
        self.progress.show(PROGRESS_LABEL);

        let guard = DismissOnDrop(Arc::clone(&self.progress));
        let classifier = Arc::clone(&self.classifier);
        let token = self.cancel.clone();

        self.pending = Some(tokio::spawn(async move {
            let _guard = guard;
            debug!(classifier = classifier.name(), "classification started");
            classifier.classify(&request, &token).await
        }));
        Ok(())
    }

    /// Wait for the in-flight request and settle the cycle.
    ///
    /// The result is delivered once; a second call without a new
    /// [`start`](Self::start) is an error. Cancel-safe: if this future is
    /// dropped, the request stays pending and a later call picks it up.
    pub async fn finish(&mut self) -> Result<Outcome> {
        let handle = self.pending.as_mut().ok_or_else(|| {
            ClearbinError::InvalidState("no classification in flight".to_string())
        })?;

        let joined = handle.await;
        self.pending = None;

        let result = match joined {
            Ok(result) => result,
            Err(e) => Err(ClearbinError::InvalidState(format!(
                "classification task failed: {e}"
            ))),
        };

        Ok(self.settle(result))
    }

    /// Capture, encode and classify in one cycle.
    ///
    /// Capture and encoding failures end the cycle in `Failed` like request
    /// failures do; only calling this while a cycle is active is an error.
    pub async fn run_round_trip<C: CameraSource>(
        &mut self,
        controller: &CaptureController<C>,
    ) -> Result<Outcome> {
        if self.state != FlowState::Idle {
            return Err(ClearbinError::InvalidState(format!(
                "cannot capture while {:?}",
                self.state
            )));
        }

        self.state = FlowState::Capturing;
        let image = match controller.capture_image().await {
            Ok(image) => image,
            Err(e) => return Ok(self.settle(Err(e))),
        };

        self.state = FlowState::Encoding;
        let request = match controller.encode(&image) {
            Ok(request) => request,
            Err(e) => return Ok(self.settle(Err(e))),
        };

        self.start(request)?;
        self.finish().await
    }

    /// Cancel any in-flight request; its result will be discarded.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        if let Some(handle) = self.pending.take() {
            handle.abort();
            info!("classification cancelled");
        }
        self.state = FlowState::Idle;
    }

    /// Return to `Idle` once the user is back on the capture screen.
    pub fn reset(&mut self) {
        if self.state.is_terminal() {
            self.state = FlowState::Idle;
        }
    }

    fn settle(&mut self, result: Result<ClassificationResult>) -> Outcome {
        match result {
            Ok(verdict) => {
                let choice = route(&verdict);
                self.state = match &choice {
                    PresentationChoice::ShowMatch(display) => FlowState::ShowMatch(display.clone()),
                    PresentationChoice::ShowNoMatch => FlowState::ShowNoMatch,
                };
                Outcome::Presented(choice)
            }
            Err(ClearbinError::Cancelled) => {
                self.state = FlowState::Idle;
                Outcome::Discarded
            }
            Err(e) => {
                warn!(error = %e, category = ?e.category(), "classification failed");
                let message = e.user_message().to_string();
                let retryable = e.is_retryable();
                self.state = FlowState::Failed {
                    message: message.clone(),
                    retryable,
                };
                Outcome::Failed {
                    category: e.category(),
                    message,
                    retryable,
                }
            }
        }
    }
}

impl Drop for ClassificationSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
