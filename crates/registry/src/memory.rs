//! MemoryStore - in-process document store
//!
//! Every registry mutation runs inside a single write-lock critical section,
//! which gives the same guarantee a document database's atomic `$addToSet` /
//! `$pull` would: concurrent adds of distinct keys never clobber each other.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use contracts::{
    ConsumerKey, ContractError, RealmUuid, Registration, ResourceDocument, ResourceKey,
    ResourceStore,
};

/// Document store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<ResourceKey, ResourceDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store; later documents replace earlier ones with the same key
    pub fn from_documents(documents: impl IntoIterator<Item = ResourceDocument>) -> Self {
        let documents = documents.into_iter().map(|d| (d.key(), d)).collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Snapshot of every document, ordered by key
    pub async fn documents(&self) -> Vec<ResourceDocument> {
        let mut docs: Vec<_> = self.documents.read().await.values().cloned().collect();
        docs.sort_by(|a, b| a.key().cmp(&b.key()));
        docs
    }
}

impl ResourceStore for MemoryStore {
    #[instrument(name = "memory_store_insert", skip_all, fields(resource = %document.key()))]
    async fn insert(&self, document: ResourceDocument) -> Result<(), ContractError> {
        let key = document.key();
        let mut documents = self.documents.write().await;
        if documents.contains_key(&key) {
            return Err(ContractError::Store(format!("document '{key}' already exists")));
        }
        documents.insert(key, document);
        Ok(())
    }

    async fn get(&self, key: &ResourceKey) -> Result<Option<ResourceDocument>, ContractError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    #[instrument(name = "memory_store_update", skip_all, fields(resource = %key))]
    async fn update_attributes(
        &self,
        key: &ResourceKey,
        attributes: Map<String, Value>,
    ) -> Result<ResourceDocument, ContractError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(key)
            .ok_or_else(|| ContractError::resource_not_found(key.to_string()))?;
        document.attributes = attributes;
        Ok(document.clone())
    }

    #[instrument(
        name = "memory_store_add_consumer",
        skip_all,
        fields(resource = %key, consumer = %consumer)
    )]
    async fn add_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
    ) -> Result<Registration, ContractError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(key)
            .ok_or_else(|| ContractError::resource_not_found(key.to_string()))?;
        let registration = document.resource_consumers.add(consumer);
        debug!(?registration, consumers = document.resource_consumers.len(), "Consumer added");
        Ok(registration)
    }

    #[instrument(
        name = "memory_store_remove_consumer",
        skip_all,
        fields(resource = %key, consumer = %consumer)
    )]
    async fn remove_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
    ) -> Result<(), ContractError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(key)
            .ok_or_else(|| ContractError::resource_not_found(key.to_string()))?;
        if !document.resource_consumers.remove(consumer) {
            return Err(ContractError::consumer_not_found(
                key.to_string(),
                consumer.service_uuid.as_str(),
                consumer.realm_uuid.as_str(),
            ));
        }
        Ok(())
    }

    async fn delete(&self, key: &ResourceKey) -> Result<Option<ResourceDocument>, ContractError> {
        Ok(self.documents.write().await.remove(key))
    }

    async fn find_in_realm(
        &self,
        resource_type: &str,
        realm: &RealmUuid,
    ) -> Result<Vec<ResourceDocument>, ContractError> {
        let documents = self.documents.read().await;
        let mut found: Vec<_> = documents
            .values()
            .filter(|d| d.resource_type == resource_type && d.resource_consumers.has_realm(realm))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        Ok(found)
    }
}
