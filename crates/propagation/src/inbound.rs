//! Consumer-side contract
//!
//! Routes a consumer must accept, with or without the `/backend` prefix:
//! `POST|PUT|DELETE [/backend]/api/resources/{klass}/{uuid}`.

use contracts::{ContractError, HttpMethod, ResourceUuid, SignedEnvelope};

use crate::envelope::verify_envelope;
use crate::signer::Signer;

/// Action requested by an inbound route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Create,
    Update,
    Destroy,
}

/// A recognised inbound resource route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoute {
    pub action: ResourceAction,
    pub klass: String,
    pub uuid: ResourceUuid,
}

impl ResourceRoute {
    /// Match a request line; `None` for anything outside the resource API
    pub fn parse(method: HttpMethod, path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or(path);
        let rest = path.strip_prefix("/backend").unwrap_or(path);
        let rest = rest.strip_prefix("/api/resources/")?;

        let mut segments = rest.split('/');
        let klass = segments.next().filter(|s| !s.is_empty())?;
        let uuid = segments.next().filter(|s| !s.is_empty())?;
        if segments.next().is_some() {
            return None;
        }

        let action = match method {
            HttpMethod::Post => ResourceAction::Create,
            HttpMethod::Put => ResourceAction::Update,
            HttpMethod::Delete => ResourceAction::Destroy,
        };

        Some(Self {
            action,
            klass: klass.to_string(),
            uuid: uuid.into(),
        })
    }
}

/// Decode and authenticate an inbound create/update body
///
/// # Errors
/// Malformed JSON, or `SignatureConfiguration` for an empty secret
pub fn verify_request(secret: &str, body: &[u8]) -> Result<Option<SignedEnvelope>, ContractError> {
    let signer = Signer::new(secret)?;
    let envelope: SignedEnvelope = serde_json::from_slice(body)?;
    if verify_envelope(&signer, &envelope)? {
        Ok(Some(envelope))
    } else {
        Ok(None)
    }
}
