//! Configuration Loader
//!
//! Layers an optional configuration file and `REBUILD__`-prefixed environment
//! variables over the built-in defaults, then validates the result.

use ::config::{Config, Environment, File};
use std::path::PathBuf;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::PipelineConfig;

pub const ENV_PREFIX: &str = "REBUILD";
pub const ENV_SEPARATOR: &str = "__";

/// Builds a validated [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    file_required: bool,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            file: None,
            file_required: false,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this file; loading fails if it does not exist
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = true;
        self
    }

    /// Read this file when present
    pub fn with_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = false;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> ConfigResult<PipelineConfig> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if self.file_required && !path.exists() {
                return Err(ConfigurationError::config_file_not_found(path));
            }
            debug!(path = %path.display(), required = self.file_required, "Adding configuration file source");
            builder = builder.add_source(File::from(path.as_path()).required(self.file_required));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("retry.retryable_status_codes"),
        );

        let config: PipelineConfig = builder
            .build()
            .and_then(|merged| merged.try_deserialize())
            .map_err(|e| ConfigurationError::load_error(self.source_description(), e))?;

        config.validate()?;

        debug!(
            config = %serde_json::to_string(&config.sanitized())
                .unwrap_or_else(|_| "[serialization error]".to_string()),
            "Configuration loaded"
        );
        info!(
            source = %self.source_description(),
            cache_namespace = %config.cache.namespace,
            max_retries = config.retry.max_retries,
            "✅ Configuration loaded successfully"
        );

        Ok(config)
    }

    fn source_description(&self) -> String {
        match &self.file {
            Some(path) => format!("{} + {}{}*", path.display(), self.env_prefix, ENV_SEPARATOR),
            None => format!("defaults + {}{}*", self.env_prefix, ENV_SEPARATOR),
        }
    }
}
