//! # Dispatcher
//!
//! Asynchronous job runner for propagation jobs.
//!
//! Responsibilities:
//! - Named bounded queue (`resource` by default)
//! - Worker pool invoking a [`contracts::JobHandler`] per job
//! - Exponential backoff retries, dead-job accounting
//! - Draining shutdown

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod log_handler;
pub mod metrics;
pub mod queue;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use contracts::{JobHandler, JobSubmitter, PropagationJob};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::DispatcherHandle;
pub use log_handler::LogHandler;
pub use metrics::{QueueMetrics, QueueSnapshot};
pub use queue::{JobQueue, QueueSubmitter};
pub use retry::RetryPolicy;
