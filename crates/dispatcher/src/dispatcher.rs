//! Dispatcher - builds the job queue and starts the worker pool

use std::sync::Arc;

use tracing::{info, instrument};

use contracts::{JobHandler, QueueConfig};

use crate::error::DispatcherError;
use crate::handle::DispatcherHandle;
use crate::metrics::QueueMetrics;
use crate::queue::{JobQueue, QueueSubmitter};
use crate::retry::RetryPolicy;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub queue: String,
    pub capacity: usize,
    pub workers: usize,
    pub retry: RetryPolicy,
}

impl From<&QueueConfig> for DispatcherConfig {
    fn from(config: &QueueConfig) -> Self {
        Self {
            queue: config.name.clone(),
            capacity: config.capacity,
            workers: config.workers,
            retry: RetryPolicy::from(config),
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::from(&QueueConfig::default())
    }
}

/// Queue plus not-yet-started worker pool
///
/// Jobs may be submitted before [`Dispatcher::spawn`]; they wait in the queue.
pub struct Dispatcher {
    config: DispatcherConfig,
    queue: JobQueue,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        let queue = JobQueue::new(config.queue.as_str(), config.capacity);
        Self { config, queue }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn submitter(&self) -> QueueSubmitter {
        self.queue.submitter()
    }

    pub fn metrics(&self) -> &Arc<QueueMetrics> {
        self.queue.metrics()
    }

    /// Start `workers` tasks running `handler`
    #[instrument(
        name = "dispatcher_spawn",
        skip(self, handler),
        fields(queue = %self.config.queue, workers = self.config.workers, handler = handler.name())
    )]
    pub fn spawn<H>(self, handler: Arc<H>) -> Result<DispatcherHandle, DispatcherError>
    where
        H: JobHandler + Send + Sync + 'static,
    {
        if self.config.workers == 0 {
            return Err(DispatcherError::invalid_config(
                "workers",
                "must be greater than 0",
            ));
        }
        if self.config.retry.max_attempts == 0 {
            return Err(DispatcherError::invalid_config(
                "max_attempts",
                "must be at least 1",
            ));
        }

        let handle = DispatcherHandle::spawn(
            self.queue,
            handler,
            self.config.workers,
            self.config.retry,
        );
        info!(backlog = handle.metrics().queue_len(), "Dispatcher started");
        Ok(handle)
    }
}

/// Convenience function to start a dispatcher from the queue config
pub fn create_dispatcher<H>(
    config: &QueueConfig,
    handler: Arc<H>,
) -> Result<DispatcherHandle, DispatcherError>
where
    H: JobHandler + Send + Sync + 'static,
{
    Dispatcher::new(DispatcherConfig::from(config)).spawn(handler)
}
