//! # Propagation
//!
//! Provider-side resource propagation: signs, serializes and delivers
//! resource state to registered consumer services.
//!
//! ## Components
//!
//! - [`Signer`]: HMAC-SHA256 body signatures
//! - [`serializer`]: allow-listed transmissible fields of a [`contracts::Resourceable`]
//! - [`Propagator`]: registry-driven fan-out, queued pushes, synchronous deletes
//! - [`JobExecutor`]: executes one queued job against a consumer
//! - [`Provider`]: typed lifecycle hooks (create / update / destroy)
//! - [`HttpTransport`], [`StaticDirectory`]: default network seams
//!
//! ## Example
//!
//! ```ignore
//! let executor = Arc::new(JobExecutor::new(store, directory, transport, sender));
//! let propagator = Arc::new(Propagator::new(executor, queue.submitter()));
//! let models: Provider<ProviderModel, _, _, _, _> = Provider::new(propagator);
//! models.update(&marta).await?;
//! ```

pub mod directory;
pub mod engine;
pub mod envelope;
pub mod executor;
pub mod http;
pub mod inbound;
pub mod provider;
pub mod serializer;
pub mod signer;

#[cfg(test)]
pub(crate) mod testing;

pub use directory::StaticDirectory;
pub use engine::{ConsumerOutcome, Propagator, RemoteOutcome};
pub use envelope::{build_envelope, verify_envelope};
pub use executor::JobExecutor;
pub use http::HttpTransport;
pub use inbound::{verify_request, ResourceAction, ResourceRoute};
pub use provider::Provider;
pub use signer::{sign, Signer};
