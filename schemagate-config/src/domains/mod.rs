//! Domain-specific configuration modules

pub mod logging;
pub mod migrations;
pub mod reset;

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::validation::Validatable;

/// Main schemagate configuration combining all domains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemagateConfig {
    /// Migration source, target and default run
    pub migrations: migrations::MigrationsConfig,

    /// Destructive reset guard
    pub reset: reset::ResetConfig,

    /// Logging configuration
    pub logging: logging::LoggingConfig,
}

impl SchemagateConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.migrations.validate()?;
        self.reset.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = SchemagateConfig::default();
        serde_yaml::to_string(&config).unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
