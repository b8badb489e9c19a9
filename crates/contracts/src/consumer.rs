//! Consumer registry - the per-resource collection of registered consumers
//!
//! Entries are unique by (service_uuid, realm_uuid). Adding is additive:
//! an existing pair is never duplicated and never replaced.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{JobKind, RealmUuid, ServiceUuid};

/// Registry key of one consumer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerKey {
    pub service_uuid: ServiceUuid,
    pub realm_uuid: RealmUuid,
}

impl ConsumerKey {
    pub fn new(service_uuid: impl Into<ServiceUuid>, realm_uuid: impl Into<RealmUuid>) -> Self {
        Self {
            service_uuid: service_uuid.into(),
            realm_uuid: realm_uuid.into(),
        }
    }
}

impl fmt::Display for ConsumerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.service_uuid, self.realm_uuid)
    }
}

/// One registered interest, as persisted
///
/// Both fields are optional at the persistence level: a stored document may
/// carry a corrupt entry, which fan-out must skip rather than choke on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerEntry {
    #[serde(default)]
    pub service_uuid: Option<ServiceUuid>,
    #[serde(default)]
    pub realm_uuid: Option<RealmUuid>,
}

impl ConsumerEntry {
    /// Entry for a well-formed key
    pub fn new(key: &ConsumerKey) -> Self {
        Self {
            service_uuid: Some(key.service_uuid.clone()),
            realm_uuid: Some(key.realm_uuid.clone()),
        }
    }

    /// The entry's key, or the reason it is malformed
    pub fn key(&self) -> Result<ConsumerKey, &'static str> {
        let service = match &self.service_uuid {
            Some(s) if !s.is_blank() => s.clone(),
            _ => return Err("missing service_uuid"),
        };
        let realm = match &self.realm_uuid {
            Some(r) if !r.is_blank() => r.clone(),
            _ => return Err("missing realm_uuid"),
        };
        Ok(ConsumerKey {
            service_uuid: service,
            realm_uuid: realm,
        })
    }

    /// Exact match on both identity fields
    pub fn matches(&self, key: &ConsumerKey) -> bool {
        self.service_uuid.as_ref() == Some(&key.service_uuid)
            && self.realm_uuid.as_ref() == Some(&key.realm_uuid)
    }

    pub fn in_realm(&self, realm: &RealmUuid) -> bool {
        self.realm_uuid.as_ref() == Some(realm)
    }
}

/// Outcome of adding a consumer to a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new entry was appended
    Created,
    /// The pair was already registered; membership unchanged
    AlreadyRegistered,
}

impl Registration {
    /// Propagation kind the engine must enqueue for this outcome
    pub fn job_kind(self) -> JobKind {
        match self {
            Self::Created => JobKind::Create,
            Self::AlreadyRegistered => JobKind::Update,
        }
    }
}

/// Ordered collection of consumer entries attached to a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumerRegistry {
    entries: Vec<ConsumerEntry>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw entries, preserving order (and any malformed entries)
    pub fn from_entries(entries: Vec<ConsumerEntry>) -> Self {
        Self { entries }
    }

    /// Append the key unless already present
    pub fn add(&mut self, key: &ConsumerKey) -> Registration {
        if self.find(key).is_some() {
            return Registration::AlreadyRegistered;
        }
        self.entries.push(ConsumerEntry::new(key));
        Registration::Created
    }

    pub fn find(&self, key: &ConsumerKey) -> Option<&ConsumerEntry> {
        self.entries.iter().find(|e| e.matches(key))
    }

    pub fn contains(&self, key: &ConsumerKey) -> bool {
        self.find(key).is_some()
    }

    /// Remove the matching entry; false when nothing matched
    pub fn remove(&mut self, key: &ConsumerKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(key));
        self.entries.len() != before
    }

    /// True when at least one entry is scoped to `realm`
    pub fn has_realm(&self, realm: &RealmUuid) -> bool {
        self.entries.iter().any(|e| e.in_realm(realm))
    }

    /// Split entries into well-formed keys and malformed entries with reasons
    pub fn partition(&self) -> (Vec<ConsumerKey>, Vec<(&ConsumerEntry, &'static str)>) {
        let mut keys = Vec::with_capacity(self.entries.len());
        let mut malformed = Vec::new();
        for entry in &self.entries {
            match entry.key() {
                Ok(key) => keys.push(key),
                Err(reason) => malformed.push((entry, reason)),
            }
        }
        (keys, malformed)
    }

    pub fn entries(&self) -> &[ConsumerEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsumerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
