//! JobExecutor - runs one propagation job against a consumer
//!
//! Every call resolves the consumer address and the resource state afresh, so
//! a late or reordered job still delivers the latest persisted fields.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, instrument, warn};

use contracts::{
    resource_path, ConsumerKey, ConsumerTransport, ContractError, HttpMethod, JobHandler,
    OutboundRequest, PropagationJob, ResourceKey, ResourceStore, ServiceDirectory, ServiceUuid,
};

use crate::envelope::build_envelope;
use crate::signer::Signer;

/// Executes propagation jobs; shared by the dispatcher and the engine
pub struct JobExecutor<S, D, T> {
    store: Arc<S>,
    directory: Arc<D>,
    transport: Arc<T>,
    /// This provider's identity, placed in every envelope
    sender: ServiceUuid,
}

impl<S, D, T> JobExecutor<S, D, T>
where
    S: ResourceStore + Sync,
    D: ServiceDirectory + Sync,
    T: ConsumerTransport + Sync,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, transport: Arc<T>, sender: ServiceUuid) -> Self {
        Self {
            store,
            directory,
            transport,
            sender,
        }
    }

    pub fn sender(&self) -> &ServiceUuid {
        &self.sender
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Tell one consumer the resource is gone, in the caller's path
    #[instrument(
        name = "executor_deliver_delete",
        skip_all,
        fields(resource = %resource, consumer = %consumer)
    )]
    pub async fn deliver_delete(
        &self,
        resource: &ResourceKey,
        consumer: &ConsumerKey,
    ) -> Result<(), ContractError> {
        let endpoint = self
            .directory
            .discover(&consumer.service_uuid, &consumer.realm_uuid)
            .await?;
        let url = endpoint.url_for(&resource_path(&resource.resource_type, &resource.uuid));
        self.call(HttpMethod::Delete, url, None).await
    }

    async fn execute(&self, job: &PropagationJob) -> Result<(), ContractError> {
        let resource = job.resource_key();
        let endpoint = self
            .directory
            .discover(&job.service_uuid, &job.realm_uuid)
            .await?;
        let url = endpoint.url_for(&resource_path(&resource.resource_type, &resource.uuid));

        let body = if job.kind.carries_payload() {
            let Some(document) = self.store.get(&resource).await? else {
                debug!(resource = %resource, "Resource gone before delivery, nothing to send");
                return Ok(());
            };
            let fields = document.project(job.fields());
            let signer = Signer::new(&endpoint.secret)?;
            let envelope = build_envelope(&signer, &fields, &job.realm_uuid, &self.sender)?;
            Some(Bytes::from(envelope.to_body()?))
        } else {
            None
        };

        self.call(job.kind.method(), url, body).await
    }

    async fn call(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<Bytes>,
    ) -> Result<(), ContractError> {
        let result = self
            .transport
            .send(OutboundRequest {
                method,
                url: url.clone(),
                body,
            })
            .await;

        match result {
            Ok(response) if response.is_success() => {
                observability::record_remote_call(method, Some(response.status));
                debug!(%method, %url, status = response.status, "Consumer accepted");
                Ok(())
            }
            Ok(response) => {
                observability::record_remote_call(method, Some(response.status));
                warn!(%method, %url, status = response.status, "Consumer rejected");
                Err(ContractError::remote_delivery(
                    method.as_str(),
                    url,
                    Some(response.status),
                    "non-success status",
                ))
            }
            Err(e) => {
                observability::record_remote_call(method, None);
                warn!(%method, %url, error = %e, "Consumer unreachable");
                Err(e)
            }
        }
    }
}

impl<S, D, T> JobHandler for JobExecutor<S, D, T>
where
    S: ResourceStore + Send + Sync,
    D: ServiceDirectory + Send + Sync,
    T: ConsumerTransport + Send + Sync,
{
    fn name(&self) -> &str {
        "propagation"
    }

    #[instrument(
        name = "executor_handle",
        skip_all,
        fields(job_id = %job.id, kind = %job.kind, resource = %job.resource_key(), consumer = %job.consumer_key())
    )]
    async fn handle(&self, job: &PropagationJob) -> Result<(), ContractError> {
        let started = Instant::now();
        let result = self.execute(job).await;
        observability::record_job_latency_ms(job.kind, started.elapsed().as_secs_f64() * 1000.0);
        result
    }
}
