//! HTTP client for the clearbin detect service.
//!
//! One classification is one `POST` of `{"imgb64": "<data uri>"}` with a
//! JSON content type. The service answers with string-typed fields:
//!
//! ```json
//! {"message": "ok", "pred_time": "120", "confidence": "0.92",
//!  "cluster": "3", "cluster_name": "Plastic Bottle", "materials": "PET"}
//! ```
//!
//! A `message` of exactly `"No object detected."` means nothing was found;
//! the other fields are then ignored.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::traits::ImageClassifier;
use crate::config::ClientConfig;
use crate::telemetry;
use crate::types::{ClassificationRequest, ClassificationResult, Detection, NO_DETECTION_MESSAGE};
use crate::{ClearbinError, Result};

/// Default detect endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://clearbin-bk.herokuapp.com/detect";

/// Default upper bound for one request, connect to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the detect endpoint.
#[derive(Clone)]
pub struct ClassificationClient {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl ClassificationClient {
    /// Create a client for the default endpoint.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client for a custom endpoint (for testing with wiremock).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        Self::builder().endpoint(endpoint).build()
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::builder()
            .endpoint(config.endpoint.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
    }

    pub fn builder() -> ClassificationClientBuilder {
        ClassificationClientBuilder::new()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one image and parse the verdict.
    ///
    /// Returns `Cancelled` as soon as `cancel` fires; the in-flight request
    /// is dropped.
    #[instrument(name = "detect.classify", skip_all, fields(endpoint = %self.endpoint))]
    pub async fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> Result<ClassificationResult> {
        let start = Instant::now();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClearbinError::Cancelled),
            result = self.send(request) => result,
        };

        record_request(start, &result);
        result
    }

    async fn send(&self, request: &ClassificationRequest) -> Result<ClassificationResult> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response_errors(&response)?;

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        parse_response(&body)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClearbinError {
        if err.is_timeout() {
            ClearbinError::Timeout(self.timeout)
        } else {
            ClearbinError::Http(err.to_string())
        }
    }

    /// Check response status and map to appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        Err(ClearbinError::Api {
            status: status.as_u16(),
            message: format!("detect service error: {status}"),
        })
    }
}

#[async_trait]
impl ImageClassifier for ClassificationClient {
    fn name(&self) -> &str {
        "detect"
    }

    async fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> Result<ClassificationResult> {
        ClassificationClient::classify(self, request, cancel).await
    }
}

/// Builder for [`ClassificationClient`].
pub struct ClassificationClientBuilder {
    endpoint: String,
    timeout: Duration,
}

impl Default for ClassificationClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassificationClientBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Request deadline. Zero is rejected at build time.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ClassificationClient> {
        if self.endpoint.is_empty() {
            return Err(ClearbinError::Configuration(
                "detect endpoint must not be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ClearbinError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClearbinError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(ClassificationClient {
            http,
            endpoint: self.endpoint,
            timeout: self.timeout,
        })
    }
}

/// Record request outcome metrics (counter + histogram).
fn record_request(start: Instant, result: &Result<ClassificationResult>) {
    let status = match result {
        Ok(_) => "ok",
        Err(ClearbinError::Cancelled) => "cancelled",
        Err(_) => "error",
    };
    metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => status).increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

    if let Ok(verdict) = result {
        let outcome = if verdict.is_match() { "match" } else { "no_match" };
        metrics::counter!(telemetry::VERDICTS_TOTAL, "outcome" => outcome).increment(1);
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// A field the service may send as a JSON string or a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Text(String),
    Number(serde_json::Number),
}

impl Lenient {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }

    fn to_f64(&self, field: &str) -> Result<f64> {
        let value = match self {
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Number(n) => n.as_f64(),
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| ClearbinError::Parse(format!("field `{field}` is not a number")))
    }
}

#[derive(Deserialize)]
struct DetectFields {
    pred_time: Option<Lenient>,
    confidence: Option<Lenient>,
    cluster: Option<Lenient>,
    cluster_name: Option<String>,
    materials: Option<String>,
    recyclable: Option<bool>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| ClearbinError::Parse(format!("missing field `{field}`")))
}

/// Parse a detect response body into a verdict.
///
/// Malformed JSON and missing fields on a match are errors; a no-detection
/// message short-circuits before any other field is read.
pub fn parse_response(body: &str) -> Result<ClassificationResult> {
    let value: Value = serde_json::from_str(body)?;

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ClearbinError::Parse("missing field `message`".to_string()))?;
    debug!(server_message = %message, "detect response");

    if message == NO_DETECTION_MESSAGE {
        return Ok(ClassificationResult::NoMatch);
    }

    let fields: DetectFields = serde_json::from_value(value)
        .map_err(|e| ClearbinError::Parse(format!("unexpected field type: {e}")))?;

    let cluster_name = required(fields.cluster_name, "cluster_name")?;
    let confidence = required(fields.confidence, "confidence")?.to_f64("confidence")?;
    let pred_time = required(fields.pred_time, "pred_time")?.to_f64("pred_time")?;
    let cluster = required(fields.cluster, "cluster")?.into_string();
    let materials = required(fields.materials, "materials")?;

    // Without an explicit flag every recognised object counts as recyclable.
    let recyclable = match fields.recyclable {
        Some(flag) => flag,
        None => {
            debug!("response carries no recyclable flag, assuming recyclable");
            true
        }
    };

    if cluster_name.is_empty() {
        warn!(server_message = %message, "detection without a cluster name");
    }
    debug!(
        %cluster_name,
        %cluster,
        confidence,
        pred_time,
        %materials,
        recyclable,
        "parsed detection"
    );

    Ok(ClassificationResult::Match(Detection {
        cluster_name,
        cluster,
        confidence,
        pred_time,
        materials,
        recyclable,
    }))
}
