//! Propagator - per (resource, consumer) propagation policy
//!
//! Registry changes are applied synchronously. Create/update/refresh pushes
//! are queued; remove and destroy notify consumers in the caller's path.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use contracts::{
    ConsumerEntry, ConsumerKey, ConsumerRegistry, ConsumerTransport, ContractError, JobKind,
    JobSubmitter, PropagationJob, RealmUuid, Registration, ResourceDocument, ResourceKey,
    ResourceStore, ServiceDirectory,
};

use crate::executor::JobExecutor;

/// Result of a synchronous remote delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Delivered,
    Failed { reason: String },
}

impl RemoteOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    fn from_result(result: Result<(), ContractError>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Remote delete outcome for one consumer of a destroyed resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerOutcome {
    pub consumer: ConsumerKey,
    pub outcome: RemoteOutcome,
}

/// Propagation engine over a store, an executor and a job queue
pub struct Propagator<S, D, T, Q> {
    store: Arc<S>,
    executor: Arc<JobExecutor<S, D, T>>,
    queue: Q,
}

impl<S, D, T, Q> Propagator<S, D, T, Q>
where
    S: ResourceStore + Send + Sync,
    D: ServiceDirectory + Send + Sync,
    T: ConsumerTransport + Send + Sync,
    Q: JobSubmitter + Sync,
{
    pub fn new(executor: Arc<JobExecutor<S, D, T>>, queue: Q) -> Self {
        Self {
            store: Arc::clone(executor.store()),
            executor,
            queue,
        }
    }

    pub fn executor(&self) -> &Arc<JobExecutor<S, D, T>> {
        &self.executor
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Register `consumer` and queue one create (new) or update (existing) job
    ///
    /// A new entry is rolled back when its create job cannot be queued, so a
    /// retried add still sends the create.
    #[instrument(
        name = "propagator_add_consumer",
        skip_all,
        fields(resource = %key, consumer = %consumer)
    )]
    pub async fn add_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
        fields: &[&str],
    ) -> Result<Registration, ContractError> {
        let registration = self.store.add_consumer(key, consumer).await?;
        let document = self.load(key).await?;
        if let Err(e) = self
            .enqueue(registration.job_kind(), &document, consumer, fields)
            .await
        {
            if registration == Registration::Created {
                warn!(error = %e, "Create job not queued, rolling back registration");
                if let Err(rollback) = self.store.remove_consumer(key, consumer).await {
                    warn!(error = %rollback, "Rollback failed");
                }
            }
            return Err(e);
        }
        info!(?registration, "Consumer registered");
        Ok(registration)
    }

    pub async fn find_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
    ) -> Result<Option<ConsumerEntry>, ContractError> {
        let document = self.load(key).await?;
        Ok(document.resource_consumers.find(consumer).cloned())
    }

    pub async fn consumers(&self, key: &ResourceKey) -> Result<ConsumerRegistry, ContractError> {
        Ok(self.load(key).await?.resource_consumers)
    }

    /// Unregister `consumer`, then tell it synchronously
    ///
    /// The removal stands even when the remote delete fails.
    #[instrument(
        name = "propagator_remove_consumer",
        skip_all,
        fields(resource = %key, consumer = %consumer)
    )]
    pub async fn remove_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
    ) -> Result<RemoteOutcome, ContractError> {
        self.store.remove_consumer(key, consumer).await?;
        let outcome = RemoteOutcome::from_result(self.executor.deliver_delete(key, consumer).await);
        match &outcome {
            RemoteOutcome::Delivered => info!("Consumer removed"),
            RemoteOutcome::Failed { reason } => {
                warn!(%reason, "Consumer removed locally, remote delete failed")
            }
        }
        Ok(outcome)
    }

    /// Queue one update job per well-formed registry entry
    ///
    /// Malformed entries are logged and skipped. Returns the number of jobs queued.
    #[instrument(name = "propagator_resource_updated", skip_all, fields(resource = %key))]
    pub async fn resource_updated(
        &self,
        key: &ResourceKey,
        fields: &[&str],
    ) -> Result<usize, ContractError> {
        self.fan_out(key, JobKind::Update, fields).await
    }

    /// Queue one `kind` job per well-formed registry entry
    pub async fn fan_out(
        &self,
        key: &ResourceKey,
        kind: JobKind,
        fields: &[&str],
    ) -> Result<usize, ContractError> {
        let document = self.load(key).await?;
        let (consumers, malformed) = document.resource_consumers.partition();
        skip_malformed(key, &malformed);

        for consumer in &consumers {
            self.enqueue(kind, &document, consumer, fields).await?;
        }
        debug!(%kind, jobs = consumers.len(), skipped = malformed.len(), "Fanned out");
        Ok(consumers.len())
    }

    /// Synchronous delete to every consumer, then drop the document
    #[instrument(name = "propagator_resource_destroyed", skip_all, fields(resource = %key))]
    pub async fn resource_destroyed(
        &self,
        key: &ResourceKey,
    ) -> Result<Vec<ConsumerOutcome>, ContractError> {
        let document = self.load(key).await?;
        let (consumers, malformed) = document.resource_consumers.partition();
        skip_malformed(key, &malformed);

        let mut outcomes = Vec::with_capacity(consumers.len());
        for consumer in consumers {
            let outcome =
                RemoteOutcome::from_result(self.executor.deliver_delete(key, &consumer).await);
            if let RemoteOutcome::Failed { reason } = &outcome {
                warn!(consumer = %consumer, %reason, "Remote delete failed");
            }
            outcomes.push(ConsumerOutcome { consumer, outcome });
        }

        self.store.delete(key).await?;
        info!(consumers = outcomes.len(), "Resource destroyed");
        Ok(outcomes)
    }

    /// Re-push to one registered consumer; `None` when the pair is not registered
    #[instrument(
        name = "propagator_refresh_consumer",
        skip_all,
        fields(resource = %key, consumer = %consumer)
    )]
    pub async fn refresh_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
        fields: &[&str],
    ) -> Result<Option<Uuid>, ContractError> {
        let document = self.load(key).await?;
        if !document.resource_consumers.contains(consumer) {
            debug!("Refresh for unregistered consumer ignored");
            return Ok(None);
        }
        let id = self
            .enqueue(JobKind::Refresh, &document, consumer, fields)
            .await?;
        Ok(Some(id))
    }

    pub async fn consumers_in_realm(
        &self,
        resource_type: &str,
        realm: &RealmUuid,
    ) -> Result<Vec<ResourceDocument>, ContractError> {
        self.store.find_in_realm(resource_type, realm).await
    }

    async fn load(&self, key: &ResourceKey) -> Result<ResourceDocument, ContractError> {
        self.store
            .get(key)
            .await?
            .ok_or_else(|| ContractError::resource_not_found(key.to_string()))
    }

    async fn enqueue(
        &self,
        kind: JobKind,
        document: &ResourceDocument,
        consumer: &ConsumerKey,
        fields: &[&str],
    ) -> Result<Uuid, ContractError> {
        let job = PropagationJob::new(
            kind,
            &document.key(),
            consumer,
            fields,
            document.project(fields.iter().copied()),
        );
        let id = job.id;
        self.queue.submit(job).await?;
        debug!(job_id = %id, %kind, consumer = %consumer, queue = self.queue.queue_name(), "Job queued");
        Ok(id)
    }
}

fn skip_malformed(key: &ResourceKey, malformed: &[(&ConsumerEntry, &'static str)]) {
    for (entry, reason) in malformed {
        let error = ContractError::malformed_entry(key.to_string(), *reason);
        warn!(%error, ?entry, "Skipping consumer entry");
        observability::record_malformed_entry(&key.resource_type);
    }
}
