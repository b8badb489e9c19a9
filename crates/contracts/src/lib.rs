//! # Contracts
//!
//! Frozen interface contracts shared by every provider crate: identifiers,
//! the persisted resource document with its consumer registry, queued
//! propagation jobs, the signed outbound envelope, configuration and the
//! async seams (store, directory, transport, queue).
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Wire convention
//! - Outbound calls target `/backend/api/resources/{resource_type}/{resource_uuid}`
//! - `POST` creates, `PUT` updates or refreshes, `DELETE` removes

mod config;
mod consumer;
mod directory;
mod document;
mod envelope;
mod error;
mod ids;
mod job;
mod queue;
mod resourceable;
mod store;
mod transport;

pub use config::*;
pub use consumer::{ConsumerEntry, ConsumerKey, ConsumerRegistry, Registration};
pub use directory::*;
pub use document::{ResourceDocument, ResourceKey, Transmissible};
pub use envelope::{resource_path, SignedEnvelope, SignedPayload, RESOURCE_API_PREFIX};
pub use error::*;
pub use ids::{RealmUuid, ResourceUuid, ServiceUuid};
pub use job::{HttpMethod, JobKind, JobRecord, PropagationJob};
pub use queue::*;
pub use resourceable::Resourceable;
pub use store::*;
pub use transport::*;
