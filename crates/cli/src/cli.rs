//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use contracts::JobKind;

/// Resource Provider - push resource state to registered consumer services
#[derive(Parser, Debug)]
#[command(
    name = "resource-provider",
    author,
    version,
    about = "Provider-side resource propagation",
    long_about = "Signs and delivers resource state to the consumer services registered on \n\
                  each resource, over the /backend/api/resources HTTP convention."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RESOURCE_PROVIDER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RESOURCE_PROVIDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Compute a body signature the way consumers verify it
    Sign(SignArgs),

    /// Propagate every resource of a dump to its registered consumers
    Push(PushArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "provider.toml", env = "RESOURCE_PROVIDER_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "provider.toml", env = "RESOURCE_PROVIDER_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `sign` command
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Shared secret
    #[arg(long, env = "RESOURCE_PROVIDER_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Raw body to sign
    #[arg(long, conflicts_with_all = ["resource", "realm", "service"])]
    pub body: Option<String>,

    /// JSON text of the transmissible fields; builds a full envelope
    #[arg(long, requires_all = ["realm", "service"])]
    pub resource: Option<String>,

    /// Realm uuid placed in the envelope
    #[arg(long)]
    pub realm: Option<String>,

    /// Sender service uuid placed in the envelope
    #[arg(long)]
    pub service: Option<String>,
}

/// Arguments for the `push` command
#[derive(Parser, Debug, Clone)]
pub struct PushArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "provider.toml", env = "RESOURCE_PROVIDER_CONFIG")]
    pub config: PathBuf,

    /// JSON resource dump (documents with their consumer registries)
    #[arg(short, long, env = "RESOURCE_PROVIDER_RESOURCES")]
    pub resources: PathBuf,

    /// Job kind queued for every registered consumer
    #[arg(long, value_enum, default_value = "update")]
    pub kind: PushKind,

    /// Log jobs instead of calling consumers
    #[arg(long)]
    pub dry_run: bool,

    /// Override worker count from configuration
    #[arg(long, env = "RESOURCE_PROVIDER_WORKERS")]
    pub workers: Option<usize>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RESOURCE_PROVIDER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print final queue metrics as JSON
    #[arg(long)]
    pub json: bool,
}

/// Job kinds a bulk push may queue
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushKind {
    Create,
    Update,
    Refresh,
}

impl From<PushKind> for JobKind {
    fn from(kind: PushKind) -> Self {
        match kind {
            PushKind::Create => JobKind::Create,
            PushKind::Update => JobKind::Update,
            PushKind::Refresh => JobKind::Refresh,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
