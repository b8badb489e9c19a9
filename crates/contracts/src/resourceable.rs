//! Resourceable - capability a domain entity implements to be propagated

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ResourceUuid;

/// A provider-owned entity whose state is pushed to registered consumers.
///
/// The transmissible field set belongs to the type, never to the caller.
///
/// # Example
///
/// ```
/// use contracts::{Resourceable, ResourceUuid};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Article {
///     uuid: String,
///     title: String,
///     draft_notes: String,
/// }
///
/// impl Resourceable for Article {
///     const RESOURCE_TYPE: &'static str = "articles";
///     const TRANSMISSIBLE_FIELDS: &'static [&'static str] = &["uuid", "title"];
///
///     fn uuid(&self) -> ResourceUuid {
///         self.uuid.as_str().into()
///     }
/// }
/// ```
pub trait Resourceable: Serialize + DeserializeOwned + Send + Sync {
    /// Path segment under `/backend/api/resources/`
    const RESOURCE_TYPE: &'static str;

    /// Allow-list of serialized field names sent to consumers
    const TRANSMISSIBLE_FIELDS: &'static [&'static str] = &["uuid"];

    fn uuid(&self) -> ResourceUuid;
}
