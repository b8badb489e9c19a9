//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::ProviderConfig;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    service: String,
    queue: QueueInfo,
    http: HttpInfo,
    consumers: Vec<ConsumerInfo>,
}

#[derive(Serialize)]
struct QueueInfo {
    name: String,
    capacity: usize,
    workers: usize,
    max_attempts: u32,
    retry_base_ms: u64,
    retry_max_ms: u64,
}

#[derive(Serialize)]
struct HttpInfo {
    timeout_ms: u64,
    user_agent: String,
}

#[derive(Serialize)]
struct ConsumerInfo {
    uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    realm: Option<String>,
    url: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{json}");
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &ProviderConfig) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        service: config.service.uuid.to_string(),
        queue: QueueInfo {
            name: config.queue.name.clone(),
            capacity: config.queue.capacity,
            workers: config.queue.workers,
            max_attempts: config.queue.max_attempts,
            retry_base_ms: config.queue.retry_base_ms,
            retry_max_ms: config.queue.retry_max_ms,
        },
        http: HttpInfo {
            timeout_ms: config.http.timeout_ms,
            user_agent: config.http.user_agent.clone(),
        },
        // Secrets never leave the process
        consumers: config
            .consumers
            .iter()
            .map(|c| ConsumerInfo {
                uuid: c.uuid.to_string(),
                realm: c.realm.as_ref().map(ToString::to_string),
                url: c.url.clone(),
            })
            .collect(),
    }
}

fn print_config_info(config: &ProviderConfig) {
    println!("Resource Provider Configuration\n");

    println!("Service");
    println!("   ├─ Version: {:?}", config.version);
    println!("   └─ UUID: {}", config.service.uuid);

    println!("\nQueue '{}'", config.queue.name);
    println!("   ├─ Capacity: {}", config.queue.capacity);
    println!("   ├─ Workers: {}", config.queue.workers);
    println!("   ├─ Max attempts: {}", config.queue.max_attempts);
    println!(
        "   └─ Backoff: {}ms .. {}ms",
        config.queue.retry_base_ms, config.queue.retry_max_ms
    );

    println!("\nHTTP");
    println!("   ├─ Timeout: {}ms", config.http.timeout_ms);
    println!("   └─ User-Agent: {}", config.http.user_agent);

    println!("\nConsumers ({})", config.consumers.len());
    for consumer in &config.consumers {
        match &consumer.realm {
            Some(realm) => println!("   - {} @ {} -> {}", consumer.uuid, realm, consumer.url),
            None => println!("   - {} (any realm) -> {}", consumer.uuid, consumer.url),
        }
    }
    println!();
}
