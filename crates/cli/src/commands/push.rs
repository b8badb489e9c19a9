//! `push` command implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use contracts::{JobHandler, JobKind, ResourceDocument};
use dispatcher::{Dispatcher, DispatcherConfig, LogHandler, QueueSnapshot};
use propagation::{HttpTransport, JobExecutor, Propagator, StaticDirectory};
use registry::MemoryStore;

use crate::cli::PushArgs;
use crate::error::CliError;

/// Fields sent for a resource type missing from `transmissible_fields`
const DEFAULT_FIELDS: &[&str] = &["uuid"];

/// Resource dump read by `push`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResourceDump {
    /// Allow-listed fields per resource type
    #[serde(default)]
    pub transmissible_fields: HashMap<String, Vec<String>>,
    pub documents: Vec<ResourceDocument>,
}

impl ResourceDump {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::resources_load(path.display().to_string(), e.to_string()))
    }

    pub fn fields_for(&self, resource_type: &str) -> Vec<&str> {
        self.transmissible_fields
            .get(resource_type)
            .map(|fields| fields.iter().map(String::as_str).collect())
            .unwrap_or_else(|| DEFAULT_FIELDS.to_vec())
    }
}

/// Execute the `push` command
pub async fn run_push(args: &PushArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }
    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        config.queue.workers = workers;
    }

    let dump = ResourceDump::load(&args.resources)?;
    info!(
        resources = dump.documents.len(),
        consumers = config.consumers.len(),
        kind = ?args.kind,
        "Resource dump loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let documents: Vec<_> = dump.documents.iter().map(ResourceDocument::key).collect();
    let store = Arc::new(MemoryStore::from_documents(dump.documents.iter().cloned()));
    let directory = Arc::new(StaticDirectory::from_config(&config.consumers));
    let transport = Arc::new(HttpTransport::new(&config.http)?);
    let executor = Arc::new(JobExecutor::new(
        store,
        directory,
        transport,
        config.service.uuid.clone(),
    ));

    let dispatcher = Dispatcher::new(DispatcherConfig::from(&config.queue));
    let propagator = Propagator::new(Arc::clone(&executor), dispatcher.submitter());

    let kind = JobKind::from(args.kind);
    let mut queued = 0;
    for key in &documents {
        let fields = dump.fields_for(&key.resource_type);
        match propagator.fan_out(key, kind, &fields).await {
            Ok(count) => queued += count,
            Err(e) => warn!(resource = %key, error = %e, "Skipping resource"),
        }
    }
    info!(jobs = queued, queue = %config.queue.name, "Jobs queued");

    let snapshot = if args.dry_run {
        drain(dispatcher, Arc::new(LogHandler::named("dry-run"))).await?
    } else {
        drain(dispatcher, executor).await?
    };

    let Some(snapshot) = snapshot else {
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&SnapshotReport::from(snapshot))?);
    } else {
        println!("{snapshot}");
    }

    if snapshot.failed > 0 || snapshot.dead > 0 {
        return Err(CliError::Incomplete {
            failed: snapshot.failed,
            dead: snapshot.dead,
        }
        .into());
    }
    Ok(())
}

/// Run workers until the backlog is empty, or until a shutdown signal
async fn drain<H>(dispatcher: Dispatcher, handler: Arc<H>) -> Result<Option<QueueSnapshot>>
where
    H: JobHandler + Send + Sync + 'static,
{
    let handle = dispatcher.spawn(handler)?;

    tokio::select! {
        snapshot = handle.shutdown() => Ok(Some(snapshot)),
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, abandoning remaining jobs");
            Ok(None)
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[derive(Serialize)]
struct SnapshotReport {
    queue_len: usize,
    enqueued: u64,
    completed: u64,
    failed: u64,
    retried: u64,
    dead: u64,
}

impl From<QueueSnapshot> for SnapshotReport {
    fn from(s: QueueSnapshot) -> Self {
        Self {
            queue_len: s.queue_len,
            enqueued: s.enqueued,
            completed: s.completed,
            failed: s.failed,
            retried: s.retried,
            dead: s.dead,
        }
    }
}
