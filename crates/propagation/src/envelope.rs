//! Envelope construction
//!
//! Built fresh per delivery attempt; the signature covers data specific to
//! one message.

use contracts::{
    ContractError, RealmUuid, ServiceUuid, SignedEnvelope, SignedPayload, Transmissible,
};

use crate::serializer;
use crate::signer::Signer;

/// Sign the transmissible fields for one realm, sent by `service`
pub fn build_envelope(
    signer: &Signer,
    fields: &Transmissible,
    realm: &RealmUuid,
    service: &ServiceUuid,
) -> Result<SignedEnvelope, ContractError> {
    let payload = SignedPayload {
        realm: realm.clone(),
        resource: serializer::encode(fields)?,
        service: service.clone(),
    };
    let sign = signer.sign(&payload.canonical_bytes()?);
    Ok(SignedEnvelope::new(payload, sign))
}

/// Recompute the signature of a received envelope
pub fn verify_envelope(signer: &Signer, envelope: &SignedEnvelope) -> Result<bool, ContractError> {
    let canonical = envelope.payload().canonical_bytes()?;
    Ok(signer.verify(&canonical, &envelope.sign))
}
