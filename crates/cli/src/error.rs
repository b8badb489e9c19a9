//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Resource dump could not be read or parsed
    #[error("Failed to load resources from {path}: {message}")]
    ResourcesLoad { path: String, message: String },

    /// Some jobs did not reach a consumer
    #[error("Propagation incomplete: {failed} failed, {dead} dead")]
    Incomplete { failed: u64, dead: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn resources_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResourcesLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
