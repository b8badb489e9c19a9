//! Resourceable serializer
//!
//! Produces the allow-listed, stable field subset of a resource. The set is
//! owned by the resource type; what a caller asks for never changes it.

use serde_json::{Map, Value};

use contracts::{ContractError, ResourceDocument, Resourceable, Transmissible};

/// Transmissible fields of `resource`
pub fn to_transmissible<R: Resourceable>(resource: &R) -> Result<Transmissible, ContractError> {
    let document = to_document(resource)?;
    Ok(document.project(R::TRANSMISSIBLE_FIELDS.iter().copied()))
}

/// Same as [`to_transmissible`]; `requested` is accepted for call-site
/// compatibility and ignored.
pub fn to_transmissible_with<R: Resourceable>(
    resource: &R,
    _requested: &[&str],
) -> Result<Transmissible, ContractError> {
    to_transmissible(resource)
}

/// Persisted form of a fresh resource (empty registry)
pub fn to_document<R: Resourceable>(resource: &R) -> Result<ResourceDocument, ContractError> {
    Ok(ResourceDocument::new(
        R::RESOURCE_TYPE,
        resource.uuid(),
        to_attributes(resource)?,
    ))
}

/// Serialized attributes of `resource` as a JSON object
pub fn to_attributes<R: Resourceable>(resource: &R) -> Result<Map<String, Value>, ContractError> {
    match serde_json::to_value(resource)? {
        Value::Object(map) => Ok(map),
        other => Err(ContractError::Other(format!(
            "{} must serialize to a JSON object, got {}",
            R::RESOURCE_TYPE,
            json_kind(&other)
        ))),
    }
}

/// Rebuild the entity from its stored document
pub fn from_document<R: Resourceable>(document: &ResourceDocument) -> Result<R, ContractError> {
    let mut attributes = document.attributes.clone();
    attributes
        .entry("uuid")
        .or_insert_with(|| Value::String(document.uuid.to_string()));
    Ok(serde_json::from_value(Value::Object(attributes))?)
}

/// JSON text of the transmissible mapping, as placed in the envelope
pub fn encode(fields: &Transmissible) -> Result<String, ContractError> {
    Ok(serde_json::to_string(fields)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
