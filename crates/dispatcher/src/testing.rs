//! Shared fixtures for unit tests

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::json;

use contracts::{
    ConsumerKey, ContractError, JobHandler, JobKind, PropagationJob, ResourceKey, Transmissible,
};

pub fn job(kind: JobKind) -> PropagationJob {
    let mut snapshot = Transmissible::new();
    snapshot.insert("name".into(), json!("Jenny"));
    snapshot.insert("uuid".into(), json!("84e8a690b6e1012e744a6c626d58b44c"));
    PropagationJob::new(
        kind,
        &ResourceKey::new("provider_models", "84e8a690b6e1012e744a6c626d58b44c"),
        &ConsumerKey::new("c1", "e75234809111012d05ac478a8af8d2ea"),
        &["name", "uuid"],
        snapshot,
    )
}

/// Fails the first `failures` calls with a retryable error, then succeeds;
/// `rejecting` fails every call with a non-retryable error
pub struct FlakyHandler {
    calls: AtomicU32,
    failures: u32,
    retryable: bool,
}

impl FlakyHandler {
    pub fn succeeding() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
            retryable: true,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures: u32::MAX,
            retryable: false,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl JobHandler for FlakyHandler {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn handle(&self, job: &PropagationJob) -> Result<(), ContractError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.failures {
            return Ok(());
        }
        if self.retryable {
            Err(ContractError::remote_delivery("PUT", "http://c1.local", Some(503), "unavailable"))
        } else {
            Err(ContractError::resource_not_found(job.resource_key().to_string()))
        }
    }
}
