//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `clearbin_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `status` — outcome: "ok", "error" or "cancelled"
//! - `outcome` — verdict: "match" or "no_match"

/// Total classification requests sent to the detect endpoint.
///
/// Labels: `status` ("ok" | "error" | "cancelled").
pub const REQUESTS_TOTAL: &str = "clearbin_requests_total";

/// Classification request duration in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "clearbin_request_duration_seconds";

/// Total parsed verdicts.
///
/// Labels: `outcome` ("match" | "no_match").
pub const VERDICTS_TOTAL: &str = "clearbin_verdicts_total";

/// Total captures persisted to the temp path.
pub const CAPTURES_TOTAL: &str = "clearbin_captures_total";
