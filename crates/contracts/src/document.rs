//! ResourceDocument - the persisted form of a provider resource
//!
//! Attributes are kept as a JSON object so the store and the job executor can
//! work without knowing the concrete entity type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::{ConsumerRegistry, ResourceUuid};

/// Allow-listed resource fields in stable key order
pub type Transmissible = BTreeMap<String, Value>;

/// Store key of a resource: type path segment plus uuid
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub resource_type: String,
    pub uuid: ResourceUuid,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, uuid: impl Into<ResourceUuid>) -> Self {
        Self {
            resource_type: resource_type.into(),
            uuid: uuid.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.uuid)
    }
}

/// A resource as stored: identity, attributes and its consumer registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
    pub resource_type: String,
    pub uuid: ResourceUuid,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub resource_consumers: ConsumerRegistry,
}

impl ResourceDocument {
    /// Document with an empty registry
    pub fn new(
        resource_type: impl Into<String>,
        uuid: impl Into<ResourceUuid>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            uuid: uuid.into(),
            attributes,
            resource_consumers: ConsumerRegistry::new(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            resource_type: self.resource_type.clone(),
            uuid: self.uuid.clone(),
        }
    }

    /// Project the named fields out of the current attributes.
    ///
    /// `uuid` always resolves, falling back to the document identity when the
    /// attributes do not carry it. Other absent fields are omitted.
    pub fn project<'a, I>(&self, fields: I) -> Transmissible
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Transmissible::new();
        for field in fields {
            match self.attributes.get(field) {
                Some(value) => {
                    out.insert(field.to_string(), value.clone());
                }
                None if field == "uuid" => {
                    out.insert(field.to_string(), Value::String(self.uuid.to_string()));
                }
                None => {}
            }
        }
        out
    }
}
