//! # Registry
//!
//! Consumer registry persistence.
//!
//! Responsibilities:
//! - Hold resource documents with their consumer registries
//! - Apply registry mutations atomically and additively
//! - Answer cross-resource realm queries

mod memory;

pub use contracts::{ConsumerKey, ConsumerRegistry, Registration, ResourceStore};
pub use memory::MemoryStore;
