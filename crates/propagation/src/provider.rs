//! Provider - lifecycle hooks for one `Resourceable` type
//!
//! Persistence happens first; propagation follows as a side effect.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{instrument, warn};
use uuid::Uuid;

use contracts::{
    ConsumerEntry, ConsumerKey, ConsumerRegistry, ConsumerTransport, ContractError, JobSubmitter,
    RealmUuid, Registration, ResourceKey, ResourceStore, ResourceUuid, Resourceable,
    ServiceDirectory,
};

use crate::engine::{ConsumerOutcome, Propagator, RemoteOutcome};
use crate::serializer;

/// Typed facade over [`Propagator`] for entities of type `R`
pub struct Provider<R, S, D, T, Q> {
    propagator: Arc<Propagator<S, D, T, Q>>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S, D, T, Q> Provider<R, S, D, T, Q>
where
    R: Resourceable,
    S: ResourceStore + Send + Sync,
    D: ServiceDirectory + Send + Sync,
    T: ConsumerTransport + Send + Sync,
    Q: JobSubmitter + Sync,
{
    pub fn new(propagator: Arc<Propagator<S, D, T, Q>>) -> Self {
        Self {
            propagator,
            _resource: PhantomData,
        }
    }

    pub fn propagator(&self) -> &Arc<Propagator<S, D, T, Q>> {
        &self.propagator
    }

    fn key(uuid: &ResourceUuid) -> ResourceKey {
        ResourceKey::new(R::RESOURCE_TYPE, uuid.clone())
    }

    /// Persist a new resource; nobody is registered yet, so nothing propagates
    pub async fn create(&self, resource: &R) -> Result<(), ContractError> {
        let document = serializer::to_document(resource)?;
        self.propagator.store().insert(document).await
    }

    pub async fn find(&self, uuid: &ResourceUuid) -> Result<Option<R>, ContractError> {
        match self.propagator.store().get(&Self::key(uuid)).await? {
            Some(document) => Ok(Some(serializer::from_document(&document)?)),
            None => Ok(None),
        }
    }

    /// Persist new attributes, then queue an update for every consumer
    ///
    /// Returns the number of jobs queued. A failed enqueue is logged and
    /// reported as zero; the persisted change stands.
    #[instrument(name = "provider_update", skip_all, fields(resource_type = R::RESOURCE_TYPE, uuid = %resource.uuid()))]
    pub async fn update(&self, resource: &R) -> Result<usize, ContractError> {
        let key = Self::key(&resource.uuid());
        let attributes = serializer::to_attributes(resource)?;
        self.propagator
            .store()
            .update_attributes(&key, attributes)
            .await?;

        match self
            .propagator
            .resource_updated(&key, R::TRANSMISSIBLE_FIELDS)
            .await
        {
            Ok(queued) => Ok(queued),
            Err(e) => {
                warn!(error = %e, "Update saved but propagation could not be queued");
                Ok(0)
            }
        }
    }

    /// Delete on every consumer, then drop the resource
    pub async fn destroy(&self, uuid: &ResourceUuid) -> Result<Vec<ConsumerOutcome>, ContractError> {
        self.propagator.resource_destroyed(&Self::key(uuid)).await
    }

    pub async fn add_consumer(
        &self,
        uuid: &ResourceUuid,
        consumer: &ConsumerKey,
    ) -> Result<Registration, ContractError> {
        self.propagator
            .add_consumer(&Self::key(uuid), consumer, R::TRANSMISSIBLE_FIELDS)
            .await
    }

    pub async fn remove_consumer(
        &self,
        uuid: &ResourceUuid,
        consumer: &ConsumerKey,
    ) -> Result<RemoteOutcome, ContractError> {
        self.propagator
            .remove_consumer(&Self::key(uuid), consumer)
            .await
    }

    pub async fn refresh_consumer(
        &self,
        uuid: &ResourceUuid,
        consumer: &ConsumerKey,
    ) -> Result<Option<Uuid>, ContractError> {
        self.propagator
            .refresh_consumer(&Self::key(uuid), consumer, R::TRANSMISSIBLE_FIELDS)
            .await
    }

    pub async fn find_consumer(
        &self,
        uuid: &ResourceUuid,
        consumer: &ConsumerKey,
    ) -> Result<Option<ConsumerEntry>, ContractError> {
        self.propagator
            .find_consumer(&Self::key(uuid), consumer)
            .await
    }

    pub async fn consumers(&self, uuid: &ResourceUuid) -> Result<ConsumerRegistry, ContractError> {
        self.propagator.consumers(&Self::key(uuid)).await
    }

    /// Every `R` with at least one consumer in `realm`
    pub async fn consumers_in_realm(&self, realm: &RealmUuid) -> Result<Vec<R>, ContractError> {
        self.propagator
            .consumers_in_realm(R::RESOURCE_TYPE, realm)
            .await?
            .iter()
            .map(serializer::from_document)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use crate::executor::JobExecutor;
    use crate::testing::{
        ProviderModel, RecordingSubmitter, RecordingTransport, CONSUMER, JENNY_UUID, OTHER_REALM,
        REALM, SECRET, SENDER,
    };
    use contracts::{ConsumerServiceConfig, JobKind};
    use registry::MemoryStore;
    use serde_json::json;

    type Models = Provider<
        ProviderModel,
        MemoryStore,
        StaticDirectory,
        RecordingTransport,
        RecordingSubmitter,
    >;

    fn provider() -> (Models, RecordingSubmitter, Arc<RecordingTransport>) {
        let directory = StaticDirectory::from_config(&[ConsumerServiceConfig {
            uuid: CONSUMER.into(),
            realm: None,
            url: "http://c1.local".into(),
            secret: SECRET.into(),
        }]);
        let transport = Arc::new(RecordingTransport::with_status(200));
        let executor = Arc::new(JobExecutor::new(
            Arc::new(MemoryStore::new()),
            Arc::new(directory),
            Arc::clone(&transport),
            SENDER.into(),
        ));
        let queue = RecordingSubmitter::default();
        let propagator = Arc::new(Propagator::new(executor, queue.clone()));
        (Provider::new(propagator), queue, transport)
    }

    fn uuid() -> ResourceUuid {
        JENNY_UUID.into()
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let (models, queue, _) = provider();
        let jenny = ProviderModel::new(JENNY_UUID, "Jenny");

        models.create(&jenny).await.unwrap();

        assert_eq!(models.find(&uuid()).await.unwrap(), Some(jenny));
        assert!(queue.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_rename_queues_update_with_new_name() {
        let (models, queue, _) = provider();
        models
            .create(&ProviderModel::new(JENNY_UUID, "Jenny"))
            .await
            .unwrap();
        models
            .add_consumer(&uuid(), &ConsumerKey::new(CONSUMER, REALM))
            .await
            .unwrap();

        let queued = models
            .update(&ProviderModel::new(JENNY_UUID, "Marta"))
            .await
            .unwrap();

        assert_eq!(queued, 1);
        let update = queue.jobs().pop().unwrap();
        assert_eq!(update.kind, JobKind::Update);
        assert_eq!(update.resource["name"], json!("Marta"));
        assert_eq!(update.resource["uuid"], json!(JENNY_UUID));
    }

    #[tokio::test]
    async fn test_update_survives_closed_queue() {
        let (models, queue, _) = provider();
        models
            .create(&ProviderModel::new(JENNY_UUID, "Jenny"))
            .await
            .unwrap();
        models
            .add_consumer(&uuid(), &ConsumerKey::new(CONSUMER, REALM))
            .await
            .unwrap();
        queue.close();

        let queued = models
            .update(&ProviderModel::new(JENNY_UUID, "Marta"))
            .await
            .unwrap();

        assert_eq!(queued, 0);
        assert_eq!(models.find(&uuid()).await.unwrap().unwrap().name, "Marta");
    }

    #[tokio::test]
    async fn test_update_unknown_resource() {
        let (models, _, _) = provider();
        let err = models
            .update(&ProviderModel::new(JENNY_UUID, "Marta"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_consumer_operations() {
        let (models, queue, transport) = provider();
        models
            .create(&ProviderModel::new(JENNY_UUID, "Jenny"))
            .await
            .unwrap();
        let c1 = ConsumerKey::new(CONSUMER, REALM);

        models.add_consumer(&uuid(), &c1).await.unwrap();
        assert!(models.find_consumer(&uuid(), &c1).await.unwrap().is_some());
        assert!(models.refresh_consumer(&uuid(), &c1).await.unwrap().is_some());
        assert_eq!(queue.jobs().len(), 2);

        let outcome = models.remove_consumer(&uuid(), &c1).await.unwrap();
        assert_eq!(outcome, RemoteOutcome::Delivered);
        assert!(models.consumers(&uuid()).await.unwrap().is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_consumers_in_realm_returns_entities() {
        let (models, _, _) = provider();
        models
            .create(&ProviderModel::new(JENNY_UUID, "Jenny"))
            .await
            .unwrap();
        models
            .create(&ProviderModel::new("m2", "Marta"))
            .await
            .unwrap();
        models
            .add_consumer(&uuid(), &ConsumerKey::new(CONSUMER, REALM))
            .await
            .unwrap();
        models
            .add_consumer(&"m2".into(), &ConsumerKey::new(CONSUMER, OTHER_REALM))
            .await
            .unwrap();

        let in_realm = models.consumers_in_realm(&REALM.into()).await.unwrap();
        assert_eq!(in_realm, vec![ProviderModel::new(JENNY_UUID, "Jenny")]);
    }

    #[tokio::test]
    async fn test_destroy_removes_resource() {
        let (models, _, transport) = provider();
        models
            .create(&ProviderModel::new(JENNY_UUID, "Jenny"))
            .await
            .unwrap();
        models
            .add_consumer(&uuid(), &ConsumerKey::new(CONSUMER, REALM))
            .await
            .unwrap();

        let outcomes = models.destroy(&uuid()).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].outcome.is_delivered());
        assert_eq!(transport.requests().len(), 1);
        assert!(models.find(&uuid()).await.unwrap().is_none());
    }
}
