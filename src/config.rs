//! Configuration file support for threatflow.
//!
//! Provides YAML-based configuration through `threatflow.config.yml`
//! files, including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::application::use_cases::MutationFailurePolicy;
use crate::ports::outbound::DEFAULT_PRESIGN_EXPIRY;
use crate::shared::{Result, WorkflowError};

pub const CONFIG_FILENAME: &str = "threatflow.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub storage_endpoint: Option<String>,
    pub presign_expiry_secs: Option<u64>,
    pub on_mutation_failure: Option<MutationFailurePolicy>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    for (field, endpoint) in [
        ("api_endpoint", &config.api_endpoint),
        ("storage_endpoint", &config.storage_endpoint),
    ] {
        if let Some(endpoint) = endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                bail!(
                    "Invalid config: {} must start with http:// or https://.\n\n\
                     💡 Hint: Use the full endpoint URL (e.g., \"https://api.example.com/graphql\").",
                    field
                );
            }
        }
    }

    if config.presign_expiry_secs == Some(0) {
        bail!(
            "Invalid config: presign_expiry_secs must be greater than zero.\n\n\
             💡 Hint: Presigned links need a positive lifetime; the default is 600 seconds."
        );
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

/// Effective settings after merging command-line overrides over the
/// config file. Command-line values win.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub storage_endpoint: Option<String>,
    pub presign_expiry: Duration,
    pub failure_policy: MutationFailurePolicy,
}

impl Settings {
    pub fn resolve(
        config: ConfigFile,
        api_endpoint: Option<String>,
        api_key: Option<String>,
        storage_endpoint: Option<String>,
    ) -> Result<Self> {
        let api_endpoint = api_endpoint
            .or(config.api_endpoint)
            .ok_or_else(|| WorkflowError::ConfigError {
                message: "no API endpoint configured; set api_endpoint in threatflow.config.yml or pass --api-endpoint".to_string(),
            })?;

        Ok(Self {
            api_endpoint,
            api_key: api_key.or(config.api_key),
            storage_endpoint: storage_endpoint.or(config.storage_endpoint),
            presign_expiry: config
                .presign_expiry_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PRESIGN_EXPIRY),
            failure_policy: config.on_mutation_failure.unwrap_or_default(),
        })
    }

    /// The storage endpoint, required by commands that move files.
    pub fn require_storage_endpoint(&self) -> Result<&str> {
        self.storage_endpoint.as_deref().ok_or_else(|| {
            WorkflowError::ConfigError {
                message: "no storage endpoint configured; set storage_endpoint in threatflow.config.yml or pass --storage-endpoint".to_string(),
            }
            .into()
        })
    }
}
