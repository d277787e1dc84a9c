//! Classification session flow: states, one-shot delivery, progress
//! dismissal and cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clearbin::capture::{CameraSource, CaptureController};
use clearbin::providers::{ImageClassifier, parse_response};
use clearbin::session::{ClassificationSession, FlowState, Outcome, ProgressIndicator};
use clearbin::{
    CapturedImage, ClassificationRequest, ClassificationResult, ClearbinError, DisplayState,
    ErrorCategory, FlashMode, PresentationChoice, Result,
};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mocks
// ============================================================================

/// Classifier answering with a fixed response body after an optional delay.
struct CannedClassifier {
    body: &'static str,
    delay: Duration,
    calls: AtomicUsize,
}

impl CannedClassifier {
    fn new(body: &'static str) -> Self {
        Self {
            body,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(body: &'static str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(body)
        }
    }
}

#[async_trait]
impl ImageClassifier for CannedClassifier {
    fn name(&self) -> &str {
        "canned"
    }

    async fn classify(
        &self,
        _request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = cancel.cancelled() => Err(ClearbinError::Cancelled),
            _ = tokio::time::sleep(self.delay) => parse_response(self.body),
        }
    }
}

/// Classifier failing with a network error.
struct OfflineClassifier;

#[async_trait]
impl ImageClassifier for OfflineClassifier {
    fn name(&self) -> &str {
        "offline"
    }

    async fn classify(
        &self,
        _request: &ClassificationRequest,
        _cancel: &CancellationToken,
    ) -> Result<ClassificationResult> {
        Err(ClearbinError::Http("connection refused".to_string()))
    }
}

/// Classifier that never looks at the cancellation token.
#[derive(Default)]
struct StubbornClassifier {
    completed: AtomicUsize,
}

#[async_trait]
impl ImageClassifier for StubbornClassifier {
    fn name(&self) -> &str {
        "stubborn"
    }

    async fn classify(
        &self,
        _request: &ClassificationRequest,
        _cancel: &CancellationToken,
    ) -> Result<ClassificationResult> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        parse_response(MATCH_BODY)
    }
}

#[derive(Default)]
struct CountingProgress {
    shown: AtomicUsize,
    dismissed: AtomicUsize,
}

impl ProgressIndicator for CountingProgress {
    fn show(&self, _label: &str) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn dismiss(&self) {
        self.dismissed.fetch_add(1, Ordering::SeqCst);
    }
}

struct StillCamera;

#[async_trait]
impl CameraSource for StillCamera {
    fn name(&self) -> &str {
        "still"
    }

    async fn capture(&self, _flash: FlashMode) -> Result<Vec<u8>> {
        Ok(CapturedImage::from_rgba(2, 2, vec![128; 16])?.into_bytes())
    }
}

struct BrokenCamera;

#[async_trait]
impl CameraSource for BrokenCamera {
    fn name(&self) -> &str {
        "broken"
    }

    async fn capture(&self, _flash: FlashMode) -> Result<Vec<u8>> {
        Err(ClearbinError::Capture("camera unavailable".to_string()))
    }
}

const MATCH_BODY: &str = r#"{"message":"ok","cluster_name":"Plastic Bottle","confidence":"0.92","pred_time":"120","cluster":"3","materials":"PET"}"#;
const NO_MATCH_BODY: &str = r#"{"message":"No object detected.","cluster_name":"","materials":"","confidence":"0","pred_time":"10"}"#;

fn request() -> ClassificationRequest {
    ClassificationRequest::new("data:image/jpeg;base64,AAA=")
}

fn session_with(
    classifier: Arc<dyn ImageClassifier>,
) -> (ClassificationSession, Arc<CountingProgress>) {
    let progress = Arc::new(CountingProgress::default());
    let session = ClassificationSession::new(classifier, progress.clone());
    (session, progress)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn match_cycle_ends_in_show_match() {
    let (mut session, progress) = session_with(Arc::new(CannedClassifier::new(MATCH_BODY)));

    session.start(request()).unwrap();
    assert_eq!(session.state(), &FlowState::Requesting);
    assert!(session.is_in_flight());

    let expected = DisplayState {
        material: "Plastic Bottle".to_string(),
        is_recyclable: true,
    };
    let outcome = session.finish().await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Presented(PresentationChoice::ShowMatch(expected.clone()))
    );
    assert_eq!(session.state(), &FlowState::ShowMatch(expected));
    assert_eq!(progress.shown.load(Ordering::SeqCst), 1);
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn no_match_cycle_ends_in_show_no_match() {
    let (mut session, _) = session_with(Arc::new(CannedClassifier::new(NO_MATCH_BODY)));

    session.start(request()).unwrap();
    let outcome = session.finish().await.unwrap();

    assert_eq!(outcome, Outcome::Presented(PresentationChoice::ShowNoMatch));
    assert_eq!(session.state(), &FlowState::ShowNoMatch);
}

#[tokio::test]
async fn malformed_response_fails_and_dismisses_once() {
    let (mut session, progress) = session_with(Arc::new(CannedClassifier::new("{oops")));

    session.start(request()).unwrap();
    let outcome = session.finish().await.unwrap();

    match outcome {
        Outcome::Failed {
            category,
            retryable,
            ..
        } => {
            assert_eq!(category, ErrorCategory::Parse);
            assert!(!retryable);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(session.state(), FlowState::Failed { .. }));
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn network_failure_offers_retry_and_resets_to_idle() {
    let (mut session, progress) = session_with(Arc::new(OfflineClassifier));

    session.start(request()).unwrap();
    let outcome = session.finish().await.unwrap();

    match outcome {
        Outcome::Failed {
            category,
            message,
            retryable,
        } => {
            assert_eq!(category, ErrorCategory::Network);
            assert!(!message.is_empty());
            assert!(retryable);
        }
        other => panic!("expected failure, got {other:?}"),
    }

    session.reset();
    assert_eq!(session.state(), &FlowState::Idle);
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn result_is_delivered_once() {
    let (mut session, _) = session_with(Arc::new(CannedClassifier::new(NO_MATCH_BODY)));

    session.start(request()).unwrap();
    session.finish().await.unwrap();

    let err = session.finish().await.unwrap_err();
    assert!(matches!(err, ClearbinError::InvalidState(_)));
}

#[tokio::test]
async fn second_start_while_in_flight_is_rejected() {
    let classifier = Arc::new(CannedClassifier::slow(
        NO_MATCH_BODY,
        Duration::from_millis(50),
    ));
    let (mut session, _) = session_with(classifier.clone());

    session.start(request()).unwrap();
    let err = session.start(request()).unwrap_err();
    assert!(matches!(err, ClearbinError::InvalidState(_)));

    session.finish().await.unwrap();
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn start_after_finished_cycle_requires_reset() {
    let (mut session, _) = session_with(Arc::new(CannedClassifier::new(NO_MATCH_BODY)));

    session.start(request()).unwrap();
    session.finish().await.unwrap();
    assert!(session.start(request()).is_err());

    session.reset();
    session.start(request()).unwrap();
    assert_eq!(
        session.finish().await.unwrap(),
        Outcome::Presented(PresentationChoice::ShowNoMatch)
    );
}

#[tokio::test]
async fn cancel_discards_result_and_dismisses_once() {
    let (mut session, progress) = session_with(Arc::new(CannedClassifier::slow(
        MATCH_BODY,
        Duration::from_secs(30),
    )));

    session.start(request()).unwrap();
    session.cancel();
    assert_eq!(session.state(), &FlowState::Idle);
    assert!(!session.is_in_flight());

    // The aborted task drops its dismiss guard.
    tokio::time::timeout(Duration::from_secs(5), async {
        while progress.dismissed.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("progress should be dismissed after cancel");
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancel_aborts_a_classifier_ignoring_the_token() {
    let classifier = Arc::new(StubbornClassifier::default());
    let (mut session, progress) = session_with(classifier.clone());

    session.start(request()).unwrap();
    tokio::task::yield_now().await;
    session.cancel();

    tokio::time::timeout(Duration::from_secs(5), async {
        while progress.dismissed.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("aborting the task should dismiss progress");
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);
    assert_eq!(classifier.completed.load(Ordering::SeqCst), 0);

    // The session is usable again straight away.
    session.start(request()).unwrap();
    assert!(session.is_in_flight());
    session.cancel();
}

#[tokio::test]
async fn timed_out_finish_leaves_request_pending() {
    let classifier = Arc::new(CannedClassifier::slow(
        MATCH_BODY,
        Duration::from_millis(300),
    ));
    let (mut session, progress) = session_with(classifier.clone());

    session.start(request()).unwrap();
    let early = tokio::time::timeout(Duration::from_millis(50), session.finish()).await;
    assert!(early.is_err(), "finish should not complete within 50ms");

    assert_eq!(session.state(), &FlowState::Requesting);
    assert!(session.is_in_flight());
    assert!(session.start(request()).is_err());

    let outcome = session.finish().await.unwrap();
    assert!(matches!(
        outcome,
        Outcome::Presented(PresentationChoice::ShowMatch(_))
    ));
    assert!(!session.is_in_flight());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);

    session.reset();
    assert_eq!(session.state(), &FlowState::Idle);
}

#[tokio::test]
async fn dropping_the_session_cancels_the_request() {
    let progress = Arc::new(CountingProgress::default());
    let classifier = Arc::new(CannedClassifier::slow(MATCH_BODY, Duration::from_secs(30)));

    {
        let mut session = ClassificationSession::new(classifier, progress.clone());
        session.start(request()).unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while progress.dismissed.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("progress should be dismissed after drop");
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn round_trip_from_camera_to_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let controller = CaptureController::new(StillCamera, dir.path().join("photo.jpg"));
    let (mut session, progress) = session_with(Arc::new(CannedClassifier::new(MATCH_BODY)));

    let outcome = session.run_round_trip(&controller).await.unwrap();

    assert!(matches!(
        outcome,
        Outcome::Presented(PresentationChoice::ShowMatch(_))
    ));
    assert!(controller.temp_path().exists());
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn round_trip_surfaces_capture_failure() {
    let dir = tempfile::tempdir().unwrap();
    let controller = CaptureController::new(BrokenCamera, dir.path().join("photo.jpg"));
    let (mut session, progress) = session_with(Arc::new(CannedClassifier::new(MATCH_BODY)));

    let outcome = session.run_round_trip(&controller).await.unwrap();

    match outcome {
        Outcome::Failed { category, .. } => assert_eq!(category, ErrorCategory::Capture),
        other => panic!("expected capture failure, got {other:?}"),
    }
    // No request was made, so the indicator was never shown.
    assert_eq!(progress.shown.load(Ordering::SeqCst), 0);
    assert_eq!(progress.dismissed.load(Ordering::SeqCst), 0);

    session.reset();
    assert_eq!(session.state(), &FlowState::Idle);
}
