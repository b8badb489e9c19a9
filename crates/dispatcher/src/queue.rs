//! JobQueue - named bounded channel of job records

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use tracing::debug;

use contracts::{ContractError, JobRecord, JobSubmitter, PropagationJob};

use crate::metrics::QueueMetrics;

/// A named job queue; workers take from it, submitters feed it
#[derive(Debug)]
pub struct JobQueue {
    name: Arc<str>,
    tx: Sender<JobRecord>,
    rx: Receiver<JobRecord>,
    metrics: Arc<QueueMetrics>,
}

impl JobQueue {
    pub fn new(name: impl Into<Arc<str>>, capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self {
            name: name.into(),
            tx,
            rx,
            metrics: Arc::new(QueueMetrics::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<QueueMetrics> {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Cloneable submit side
    pub fn submitter(&self) -> QueueSubmitter {
        QueueSubmitter {
            name: Arc::clone(&self.name),
            tx: self.tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    pub(crate) fn receiver(&self) -> Receiver<JobRecord> {
        self.rx.clone()
    }

    /// Stop accepting jobs; queued records stay receivable
    pub fn close(&self) -> bool {
        self.tx.close()
    }
}

/// Submit side of a [`JobQueue`]
#[derive(Clone)]
pub struct QueueSubmitter {
    name: Arc<str>,
    tx: Sender<JobRecord>,
    metrics: Arc<QueueMetrics>,
}

impl QueueSubmitter {
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn accepted(&self, kind: contracts::JobKind) {
        self.metrics.inc_enqueued();
        self.metrics.set_queue_len(self.tx.len());
        observability::record_job_enqueued(kind);
    }
}

impl JobSubmitter for QueueSubmitter {
    fn queue_name(&self) -> &str {
        &self.name
    }

    async fn submit(&self, job: PropagationJob) -> Result<(), ContractError> {
        let kind = job.kind;
        let job_id = job.id;
        self.tx
            .send(JobRecord::new(self.name.as_ref(), job))
            .await
            .map_err(|_| ContractError::QueueClosed {
                queue: self.name.to_string(),
            })?;
        self.accepted(kind);
        debug!(queue = %self.name, %job_id, %kind, "Job enqueued");
        Ok(())
    }
}
