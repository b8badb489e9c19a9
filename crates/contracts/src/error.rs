//! Layered error definitions
//!
//! Categorized by source: registry / propagation / delivery / config / store

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Registry Errors =====
    /// Removal referenced a (service, realm) pair absent from the registry
    #[error("consumer not found on '{resource}': service={service}, realm={realm}")]
    ConsumerNotFound {
        resource: String,
        service: String,
        realm: String,
    },

    /// Registry entry missing a required identity field
    #[error("malformed consumer entry on '{resource}': {reason}")]
    MalformedConsumerEntry { resource: String, reason: String },

    /// Resource document does not exist
    #[error("resource not found: {resource}")]
    ResourceNotFound { resource: String },

    // ===== Delivery Errors =====
    /// Non-2xx response or transport failure while calling a consumer
    #[error("remote delivery failed: {method} {url} (status={status:?}): {message}")]
    RemoteDelivery {
        method: String,
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Consumer service could not be discovered
    #[error("service not found: service={service}, realm={realm}")]
    ServiceNotFound { service: String, realm: String },

    /// Job queue no longer accepts submissions
    #[error("queue '{queue}' is closed")]
    QueueClosed { queue: String },

    // ===== Configuration Errors =====
    /// Missing or empty shared signing secret
    #[error("signature configuration error: {reason}")]
    SignatureConfiguration { reason: String },

    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// Document store failure
    #[error("store error: {0}")]
    Store(String),

    /// Payload (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create consumer-not-found error
    pub fn consumer_not_found(
        resource: impl Into<String>,
        service: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self::ConsumerNotFound {
            resource: resource.into(),
            service: service.into(),
            realm: realm.into(),
        }
    }

    /// Create malformed-entry error
    pub fn malformed_entry(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedConsumerEntry {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Create resource-not-found error
    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource: resource.into(),
        }
    }

    /// Create remote delivery error
    pub fn remote_delivery(
        method: impl Into<String>,
        url: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::RemoteDelivery {
            method: method.into(),
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Create service-not-found error
    pub fn service_not_found(service: impl Into<String>, realm: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
            realm: realm.into(),
        }
    }

    /// Create signature configuration error
    pub fn signature_configuration(reason: impl Into<String>) -> Self {
        Self::SignatureConfiguration {
            reason: reason.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether a queued job failing with this error should be attempted again.
    ///
    /// Registry-state and configuration errors are caller errors; repeating the
    /// call cannot change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RemoteDelivery { .. } | Self::ServiceNotFound { .. } | Self::Store(_) | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_not_found_message() {
        let err = ContractError::consumer_not_found("provider_models/abc", "svc", "realm");
        assert_eq!(
            err.to_string(),
            "consumer not found on 'provider_models/abc': service=svc, realm=realm"
        );
    }

    #[test]
    fn test_retry_classification() {
        assert!(ContractError::remote_delivery("PUT", "http://x", Some(503), "busy").is_retryable());
        assert!(ContractError::service_not_found("svc", "realm").is_retryable());
        assert!(!ContractError::consumer_not_found("r", "s", "m").is_retryable());
        assert!(!ContractError::malformed_entry("r", "missing service_uuid").is_retryable());
        assert!(!ContractError::signature_configuration("empty").is_retryable());
        assert!(!ContractError::resource_not_found("r").is_retryable());
    }
}
