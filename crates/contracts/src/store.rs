//! ResourceStore trait - document store seam
//!
//! Registry mutations must be atomic per call and additive: concurrent adds of
//! distinct keys on one resource must all survive.

use serde_json::{Map, Value};

use crate::{
    ConsumerKey, ContractError, RealmUuid, Registration, ResourceDocument, ResourceKey,
};

/// Persistence for resource documents and their consumer registries
#[trait_variant::make(ResourceStore: Send)]
pub trait LocalResourceStore {
    /// Insert a new document
    ///
    /// # Errors
    /// Fails when a document with the same key exists
    async fn insert(&self, document: ResourceDocument) -> Result<(), ContractError>;

    /// Fetch the current document
    async fn get(&self, key: &ResourceKey) -> Result<Option<ResourceDocument>, ContractError>;

    /// Replace the attributes, leaving the registry untouched
    ///
    /// Returns the updated document.
    async fn update_attributes(
        &self,
        key: &ResourceKey,
        attributes: Map<String, Value>,
    ) -> Result<ResourceDocument, ContractError>;

    /// Atomically add a consumer unless already present
    async fn add_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
    ) -> Result<Registration, ContractError>;

    /// Atomically remove a consumer
    ///
    /// # Errors
    /// `ConsumerNotFound` when no entry matches
    async fn remove_consumer(
        &self,
        key: &ResourceKey,
        consumer: &ConsumerKey,
    ) -> Result<(), ContractError>;

    /// Delete the document, returning it if it existed
    async fn delete(&self, key: &ResourceKey) -> Result<Option<ResourceDocument>, ContractError>;

    /// All documents of `resource_type` with at least one entry in `realm`
    async fn find_in_realm(
        &self,
        resource_type: &str,
        realm: &RealmUuid,
    ) -> Result<Vec<ResourceDocument>, ContractError>;
}
