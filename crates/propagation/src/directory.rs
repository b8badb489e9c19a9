//! StaticDirectory - service discovery from configuration
//!
//! Lookup order: realm-specific record first, then the realm-less record.
//! Records can be replaced at runtime; jobs resolve at execution time and
//! pick up the new address.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use contracts::{
    ConsumerEndpoint, ConsumerServiceConfig, ContractError, RealmUuid, ServiceDirectory,
    ServiceUuid,
};

type DirectoryKey = (ServiceUuid, Option<RealmUuid>);

/// In-memory directory of consumer services
#[derive(Debug, Default)]
pub struct StaticDirectory {
    records: RwLock<HashMap<DirectoryKey, ConsumerEndpoint>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[[consumers]]` config section
    pub fn from_config(consumers: &[ConsumerServiceConfig]) -> Self {
        let records = consumers
            .iter()
            .map(|c| {
                let endpoint = ConsumerEndpoint {
                    service_uuid: c.uuid.clone(),
                    base_url: c.url.trim_end_matches('/').to_string(),
                    secret: c.secret.clone(),
                };
                ((c.uuid.clone(), c.realm.clone()), endpoint)
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Insert or replace a record
    pub async fn upsert(&self, realm: Option<RealmUuid>, endpoint: ConsumerEndpoint) {
        let key = (endpoint.service_uuid.clone(), realm);
        self.records.write().await.insert(key, endpoint);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl ServiceDirectory for StaticDirectory {
    async fn discover(
        &self,
        service: &ServiceUuid,
        realm: &RealmUuid,
    ) -> Result<ConsumerEndpoint, ContractError> {
        let records = self.records.read().await;
        let endpoint = records
            .get(&(service.clone(), Some(realm.clone())))
            .or_else(|| records.get(&(service.clone(), None)))
            .cloned()
            .ok_or_else(|| ContractError::service_not_found(service.as_str(), realm.as_str()))?;
        debug!(service = %service, realm = %realm, url = %endpoint.base_url, "Service discovered");
        Ok(endpoint)
    }
}
