//! PropagationJob - serializable instruction placed on the resource queue
//!
//! A job carries identity, the resource type's allow-list and the
//! transmissible snapshot taken at enqueue time. The executor projects the
//! allow-list over the stored document when the job runs, so a delayed job
//! still sends the latest state, including fields absent at enqueue time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{ConsumerKey, RealmUuid, ResourceKey, ResourceUuid, ServiceUuid, Transmissible};

/// Operation a job performs on the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Create,
    Update,
    Delete,
    Refresh,
}

impl JobKind {
    /// HTTP verb used against the consumer
    pub fn method(self) -> HttpMethod {
        match self {
            Self::Create => HttpMethod::Post,
            Self::Update | Self::Refresh => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Refresh => "refresh",
        }
    }

    /// Whether the request carries a signed resource body
    pub fn carries_payload(self) -> bool {
        !matches!(self, Self::Delete)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deferred remote call for one (resource, consumer) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationJob {
    pub id: Uuid,
    pub kind: JobKind,
    pub resource_type: String,
    pub resource_uuid: ResourceUuid,
    pub service_uuid: ServiceUuid,
    pub realm_uuid: RealmUuid,
    /// Allow-list projected at execution time
    pub fields: Vec<String>,
    /// Transmissible fields at enqueue time
    pub resource: Transmissible,
    pub enqueued_at: DateTime<Utc>,
}

impl PropagationJob {
    pub fn new(
        kind: JobKind,
        resource: &ResourceKey,
        consumer: &ConsumerKey,
        fields: &[&str],
        snapshot: Transmissible,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            resource_type: resource.resource_type.clone(),
            resource_uuid: resource.uuid.clone(),
            service_uuid: consumer.service_uuid.clone(),
            realm_uuid: consumer.realm_uuid.clone(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            resource: snapshot,
            enqueued_at: Utc::now(),
        }
    }

    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey {
            resource_type: self.resource_type.clone(),
            uuid: self.resource_uuid.clone(),
        }
    }

    pub fn consumer_key(&self) -> ConsumerKey {
        ConsumerKey {
            service_uuid: self.service_uuid.clone(),
            realm_uuid: self.realm_uuid.clone(),
        }
    }

    /// Names of the fields to re-resolve at execution time
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Queue record wrapping a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub queue: String,
    #[serde(default)]
    pub attempts: u32,
    pub job: PropagationJob,
}

impl JobRecord {
    pub fn new(queue: impl Into<String>, job: PropagationJob) -> Self {
        Self {
            queue: queue.into(),
            attempts: 0,
            job,
        }
    }
}
