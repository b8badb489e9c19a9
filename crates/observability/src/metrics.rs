//! Propagation metrics
//!
//! Thin wrappers over the `metrics` facade; without an installed recorder
//! every call is a no-op.

use contracts::{HttpMethod, JobKind};
use metrics::{counter, histogram};

/// A job was accepted by the queue
pub fn record_job_enqueued(kind: JobKind) {
    counter!(
        "resource_provider_jobs_enqueued_total",
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// A job reached a terminal state
///
/// `status` is one of `success`, `failed`, `dead`.
pub fn record_job_completed(kind: JobKind, status: &'static str) {
    counter!(
        "resource_provider_jobs_completed_total",
        "kind" => kind.as_str(),
        "status" => status
    )
    .increment(1);
}

/// One outbound call to a consumer; `status` is `None` on transport failure
pub fn record_remote_call(method: HttpMethod, status: Option<u16>) {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    counter!(
        "resource_provider_remote_calls_total",
        "method" => method.as_str(),
        "status" => status
    )
    .increment(1);
}

/// Fan-out met a registry entry without a usable identity
pub fn record_malformed_entry(resource_type: &str) {
    counter!(
        "resource_provider_malformed_entries_total",
        "resource_type" => resource_type.to_string()
    )
    .increment(1);
}

/// Time from enqueue to completion
pub fn record_job_latency_ms(kind: JobKind, latency_ms: f64) {
    histogram!(
        "resource_provider_job_latency_ms",
        "kind" => kind.as_str()
    )
    .record(latency_ms);
}
