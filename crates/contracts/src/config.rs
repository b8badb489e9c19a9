//! ProviderConfig - Config Loader output
//!
//! Describes this provider's identity, the resource queue, the HTTP client and
//! the directory of known consumer services.

use serde::{Deserialize, Serialize};

use crate::{RealmUuid, ServiceUuid};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    /// This provider (sender identity)
    pub service: ServiceConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Known consumer services
    #[serde(default)]
    pub consumers: Vec<ConsumerServiceConfig>,
}

/// This provider's identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub uuid: ServiceUuid,
}

/// Resource queue and worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue name
    #[serde(default = "default_queue_name")]
    pub name: String,

    /// Bounded channel capacity
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Worker task count
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Attempts per job, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First retry delay; doubles per attempt
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Upper bound on retry delay
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

/// Default queue name for resource propagation jobs
pub const RESOURCE_QUEUE: &str = "resource";

fn default_queue_name() -> String {
    RESOURCE_QUEUE.to_string()
}

fn default_capacity() -> usize {
    1024
}

fn default_workers() -> usize {
    4
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_base_ms() -> u64 {
    500
}

fn default_retry_max_ms() -> u64 {
    30_000
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: default_queue_name(),
            capacity: default_capacity(),
            workers: default_workers(),
            max_attempts: default_max_attempts(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "resource-provider".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// One consumer service directory record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerServiceConfig {
    pub uuid: ServiceUuid,

    /// Realm this address applies to; `None` applies to every realm
    #[serde(default)]
    pub realm: Option<RealmUuid>,

    /// Base URL (http or https)
    pub url: String,

    /// Shared signing secret
    #[serde(default)]
    pub secret: String,
}
