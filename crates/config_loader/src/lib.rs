//! # Config Loader
//!
//! Reads the provider's TOML or JSON file into a [`ProviderConfig`]: the
//! sender identity, the resource queue and retry settings, the outbound HTTP
//! client and the directory of consumer services with their signing secrets.
//! A config that loads has every consumer reachable over http(s) and signable.
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("provider.toml"))?;
//! for consumer in &config.consumers {
//!     println!("{} -> {}", consumer.uuid, consumer.url);
//! }
//! println!("queue '{}' with {} workers", config.queue.name, config.queue.workers);
//! # Ok::<(), contracts::ContractError>(())
//! ```

mod parser;
mod validator;

pub use contracts::ProviderConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Entry point for provider configuration; stateless
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a provider config; `.toml` or `.json` picks the parser
    ///
    /// A consumer without a signing secret fails with
    /// `SignatureConfiguration`; other rejected rules with `ConfigValidation`.
    pub fn load_from_path(path: &Path) -> Result<ProviderConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate provider config text
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ProviderConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Render as TOML, secrets included
    pub fn to_toml(config: &ProviderConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(config: &ProviderConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ProviderConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}
