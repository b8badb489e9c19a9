//! DispatcherHandle - running worker pool over one job queue

use std::sync::Arc;

use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{JobHandler, JobRecord};

use crate::metrics::{QueueMetrics, QueueSnapshot};
use crate::queue::{JobQueue, QueueSubmitter};
use crate::retry::RetryPolicy;

/// Handle to a running dispatcher
#[derive(Debug)]
pub struct DispatcherHandle {
    queue: JobQueue,
    workers: Vec<JoinHandle<()>>,
}

impl DispatcherHandle {
    pub(crate) fn spawn<H>(queue: JobQueue, handler: Arc<H>, workers: usize, retry: RetryPolicy) -> Self
    where
        H: JobHandler + Send + Sync + 'static,
    {
        let workers = (0..workers)
            .map(|worker| {
                let handler = Arc::clone(&handler);
                let rx = queue.receiver();
                let metrics = Arc::clone(queue.metrics());
                let name = queue.name().to_string();
                tokio::spawn(async move {
                    job_worker(handler, rx, metrics, retry, name, worker).await;
                })
            })
            .collect();

        Self { queue, workers }
    }

    pub fn queue_name(&self) -> &str {
        self.queue.name()
    }

    pub fn submitter(&self) -> QueueSubmitter {
        self.queue.submitter()
    }

    pub fn metrics(&self) -> &Arc<QueueMetrics> {
        self.queue.metrics()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue, let workers drain the backlog, then wait for them
    #[instrument(name = "dispatcher_handle_shutdown", skip(self), fields(queue = %self.queue.name()))]
    pub async fn shutdown(self) -> QueueSnapshot {
        self.queue.close();
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!(queue = %self.queue.name(), error = ?e, "Worker task panicked");
            }
        }
        let snapshot = self.queue.metrics().snapshot();
        info!(queue = %self.queue.name(), %snapshot, "Dispatcher shutdown complete");
        snapshot
    }
}

/// Worker task: one job at a time, retried in place until terminal
#[instrument(
    name = "job_worker_loop",
    skip(handler, rx, metrics, retry, queue),
    fields(queue = %queue, handler = handler.name())
)]
async fn job_worker<H: JobHandler>(
    handler: Arc<H>,
    rx: Receiver<JobRecord>,
    metrics: Arc<QueueMetrics>,
    retry: RetryPolicy,
    queue: String,
    worker: usize,
) {
    debug!(worker, "Job worker started");

    while let Ok(mut record) = rx.recv().await {
        metrics.set_queue_len(rx.len());
        let kind = record.job.kind;

        loop {
            record.attempts += 1;
            match handler.handle(&record.job).await {
                Ok(()) => {
                    metrics.inc_completed();
                    observability::record_job_completed(kind, "success");
                    debug!(job_id = %record.job.id, %kind, attempts = record.attempts, "Job completed");
                    break;
                }
                Err(e) if !e.is_retryable() => {
                    metrics.inc_failed();
                    observability::record_job_completed(kind, "failed");
                    error!(job_id = %record.job.id, %kind, error = %e, "Job failed, not retryable");
                    break;
                }
                Err(e) if retry.exhausted(record.attempts) => {
                    metrics.inc_dead();
                    observability::record_job_completed(kind, "dead");
                    error!(
                        job_id = %record.job.id,
                        %kind,
                        attempts = record.attempts,
                        error = %e,
                        "Job dead after final attempt"
                    );
                    break;
                }
                Err(e) => {
                    metrics.inc_retried();
                    let delay = retry.delay_for(record.attempts);
                    warn!(
                        job_id = %record.job.id,
                        %kind,
                        attempt = record.attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Job attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    debug!(worker, "Job worker stopped");
}
