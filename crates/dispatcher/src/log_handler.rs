//! LogHandler - logs job summaries instead of delivering them

use contracts::{ContractError, JobHandler, PropagationJob};
use tracing::{info, instrument};

/// Dry-run handler
#[derive(Debug, Default)]
pub struct LogHandler {
    name: String,
}

impl LogHandler {
    pub fn new() -> Self {
        Self::named("log")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl JobHandler for LogHandler {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_handler_handle",
        skip(self, job),
        fields(handler = %self.name, job_id = %job.id)
    )]
    async fn handle(&self, job: &PropagationJob) -> Result<(), ContractError> {
        info!(
            kind = %job.kind,
            method = %job.kind.method(),
            resource = %job.resource_key(),
            consumer = %job.consumer_key(),
            fields = job.resource.len(),
            "Propagation job (dry run)"
        );
        Ok(())
    }
}
