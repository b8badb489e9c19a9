//! Configuration validation
//!
//! Rules:
//! - provider uuid present
//! - queue name non-empty, capacity/workers > 0, max_attempts >= 1
//! - retry_base_ms <= retry_max_ms
//! - consumer uuid present, url is http(s)
//! - consumer secret present (fatal: signatures cannot be computed without it)
//! - (uuid, realm) unique across consumers

use std::collections::HashSet;

use contracts::{ContractError, ProviderConfig};

/// Validate a ProviderConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ProviderConfig) -> Result<(), ContractError> {
    validate_service(config)?;
    validate_queue(config)?;
    validate_consumers(config)?;
    validate_consumer_secrets(config)?;
    Ok(())
}

fn validate_service(config: &ProviderConfig) -> Result<(), ContractError> {
    if config.service.uuid.is_blank() {
        return Err(ContractError::config_validation(
            "service.uuid",
            "provider uuid cannot be empty",
        ));
    }
    Ok(())
}

fn validate_queue(config: &ProviderConfig) -> Result<(), ContractError> {
    let queue = &config.queue;

    if queue.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "queue.name",
            "queue name cannot be empty",
        ));
    }
    if queue.capacity == 0 {
        return Err(ContractError::config_validation(
            "queue.capacity",
            "capacity must be > 0",
        ));
    }
    if queue.workers == 0 {
        return Err(ContractError::config_validation(
            "queue.workers",
            "workers must be > 0",
        ));
    }
    if queue.max_attempts == 0 {
        return Err(ContractError::config_validation(
            "queue.max_attempts",
            "max_attempts must be >= 1",
        ));
    }
    if queue.retry_base_ms > queue.retry_max_ms {
        return Err(ContractError::config_validation(
            "queue.retry_base_ms / queue.retry_max_ms",
            format!(
                "retry_base_ms ({}) must be <= retry_max_ms ({})",
                queue.retry_base_ms, queue.retry_max_ms
            ),
        ));
    }
    Ok(())
}

fn validate_consumers(config: &ProviderConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, consumer) in config.consumers.iter().enumerate() {
        if consumer.uuid.is_blank() {
            return Err(ContractError::config_validation(
                format!("consumers[{idx}].uuid"),
                "consumer uuid cannot be empty",
            ));
        }
        if !(consumer.url.starts_with("http://") || consumer.url.starts_with("https://")) {
            return Err(ContractError::config_validation(
                format!("consumers[{idx}].url"),
                format!("url must use http or https, got '{}'", consumer.url),
            ));
        }
        if !seen.insert((&consumer.uuid, &consumer.realm)) {
            return Err(ContractError::config_validation(
                format!("consumers[uuid={}]", consumer.uuid),
                "duplicate consumer (uuid, realm)",
            ));
        }
    }
    Ok(())
}

fn validate_consumer_secrets(config: &ProviderConfig) -> Result<(), ContractError> {
    for consumer in &config.consumers {
        if consumer.secret.trim().is_empty() {
            return Err(ContractError::signature_configuration(format!(
                "consumer '{}' has no shared secret",
                consumer.uuid
            )));
        }
    }
    Ok(())
}
