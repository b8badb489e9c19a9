//! SignedEnvelope - outbound message body
//!
//! The signature covers the canonical encoding of [`SignedPayload`]: a JSON
//! object with keys in lexicographic order (`realm`, `resource`, `service`).
//! `resource` is itself JSON text, exactly as transmitted.

use serde::{Deserialize, Serialize};

use crate::{RealmUuid, ResourceUuid, ServiceUuid};

/// Path prefix of the consumer resource API
pub const RESOURCE_API_PREFIX: &str = "/backend/api/resources";

/// `/backend/api/resources/{resource_type}/{resource_uuid}`
pub fn resource_path(resource_type: &str, uuid: &ResourceUuid) -> String {
    format!("{RESOURCE_API_PREFIX}/{resource_type}/{uuid}")
}

/// The signed portion of an envelope
///
/// Field declaration order is the canonical key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub realm: RealmUuid,
    pub resource: String,
    pub service: ServiceUuid,
}

impl SignedPayload {
    /// Canonical bytes the signature is computed over
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Payload plus signature, built fresh for every delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub resource: String,
    pub realm: RealmUuid,
    pub service: ServiceUuid,
    pub sign: String,
}

impl SignedEnvelope {
    pub fn new(payload: SignedPayload, sign: String) -> Self {
        Self {
            resource: payload.resource,
            realm: payload.realm,
            service: payload.service,
            sign,
        }
    }

    /// The part the signature must cover
    pub fn payload(&self) -> SignedPayload {
        SignedPayload {
            realm: self.realm.clone(),
            resource: self.resource.clone(),
            service: self.service.clone(),
        }
    }

    /// Request body bytes
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
