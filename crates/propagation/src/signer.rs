//! Signer - HMAC-SHA256 over canonical request bodies
//!
//! Deterministic: no timestamps or nonces, so a stateless consumer holding the
//! shared secret can recompute and compare.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use contracts::ContractError;

type HmacSha256 = Hmac<Sha256>;

/// Signs bodies with one shared secret
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

impl Signer {
    /// # Errors
    /// `SignatureConfiguration` when the secret is empty or whitespace
    pub fn new(secret: &str) -> Result<Self, ContractError> {
        if secret.trim().is_empty() {
            return Err(ContractError::signature_configuration(
                "shared secret is empty",
            ));
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .map_err(|e| ContractError::signature_configuration(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Lowercase hex HMAC-SHA256 of `body`
    pub fn sign(&self, body: &[u8]) -> String {
        hex::encode(self.keyed(body).finalize().into_bytes())
    }

    /// Constant-time comparison against a hex signature
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        match hex::decode(signature) {
            Ok(expected) => self.keyed(body).verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }

    fn keyed(&self, body: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(body);
        mac
    }
}

/// One-shot `sign(secret, body)`
pub fn sign(secret: &str, body: &[u8]) -> Result<String, ContractError> {
    Ok(Signer::new(secret)?.sign(body))
}
