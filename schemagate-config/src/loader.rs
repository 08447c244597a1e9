//! Configuration loading and environment variable handling

use std::path::Path;
use std::str::FromStr;

use crate::domains::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::domains::migrations::MigrationsConfig;
use crate::domains::reset::ResetConfig;
use crate::domains::SchemagateConfig;
use crate::error::{ConfigError, ConfigResult};

/// Default environment variable prefix
pub const DEFAULT_ENV_PREFIX: &str = "SCHEMAGATE";

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Load configuration from a YAML or JSON file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<SchemagateConfig> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let mut config: SchemagateConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<SchemagateConfig> {
        let mut config = SchemagateConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<SchemagateConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    fn apply_env_overrides(&self, config: &mut SchemagateConfig) -> ConfigResult<()> {
        self.apply_migrations_overrides(&mut config.migrations)?;
        self.apply_reset_overrides(&mut config.reset);
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_migrations_overrides(&self, config: &mut MigrationsConfig) -> ConfigResult<()> {
        if let Ok(database_url) = self.get_env_var("DATABASE_URL") {
            config.database_url = database_url;
        }

        if let Ok(source_url) = self.get_env_var("SOURCE_URL") {
            config.source_url = source_url;
        }

        if let Ok(direction) = self.get_env_var("DIRECTION") {
            config.direction = direction;
        }

        if let Ok(steps) = self.get_env_var("STEPS") {
            config.steps = steps
                .trim()
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid STEPS: {}", e)))?;
        }

        Ok(())
    }

    fn apply_reset_overrides(&self, config: &mut ResetConfig) {
        if let Ok(markers) = self.get_env_var("RESET_MARKERS") {
            config.allowed_markers = markers
                .split(',')
                .map(str::trim)
                .filter(|marker| !marker.is_empty())
                .map(String::from)
                .collect();
        }
    }

    fn apply_logging_overrides(&self, config: &mut LoggingConfig) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
