//! Job queue seams
//!
//! `JobSubmitter` is held by the propagation engine, `JobHandler` is what the
//! dispatcher invokes once per attempt.

use crate::{ContractError, PropagationJob};

/// Accepts jobs for deferred execution
#[trait_variant::make(JobSubmitter: Send)]
pub trait LocalJobSubmitter {
    /// Queue name (used for logging/metrics)
    fn queue_name(&self) -> &str;

    /// Enqueue a job
    ///
    /// # Errors
    /// `QueueClosed` when the queue is shut down
    async fn submit(&self, job: PropagationJob) -> Result<(), ContractError>;
}

/// Executes one job attempt
#[trait_variant::make(JobHandler: Send)]
pub trait LocalJobHandler {
    /// Handler name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Run the job once
    ///
    /// # Errors
    /// Errors are classified by [`ContractError::is_retryable`]
    async fn handle(&self, job: &PropagationJob) -> Result<(), ContractError>;
}
