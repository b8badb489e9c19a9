//! ServiceDirectory trait - resolves a consumer's live network address

use crate::{ContractError, RealmUuid, ServiceUuid};

/// Resolved consumer service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerEndpoint {
    pub service_uuid: ServiceUuid,
    /// Base URL without trailing slash
    pub base_url: String,
    /// Shared per-service signing secret
    pub secret: String,
}

impl ConsumerEndpoint {
    /// Absolute URL for a path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Service discovery
///
/// Called at job execution time, never at enqueue time, since addresses may
/// change in between.
#[trait_variant::make(ServiceDirectory: Send)]
pub trait LocalServiceDirectory {
    /// # Errors
    /// `ServiceNotFound` when the service is unknown in this realm
    async fn discover(
        &self,
        service: &ServiceUuid,
        realm: &RealmUuid,
    ) -> Result<ConsumerEndpoint, ContractError>;
}
