//! Migration run configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::validation::{validate_enum_choice, validate_required_string, validate_url, Validatable};

/// Accepted values for `direction`
pub const DIRECTIONS: [&str; 2] = ["up", "down"];

/// Where migrations come from, where they go and how far to move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// Database connection string
    pub database_url: String,

    /// Directory or `file://` URI holding the migration files
    pub source_url: String,

    /// Default direction, "up" or "down"
    pub direction: String,

    /// Default step count: negative runs everything, 0 does nothing
    pub steps: i64,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://schemagate_dev.db?mode=rwc".to_string(),
            source_url: "migrations".to_string(),
            direction: "up".to_string(),
            steps: -1,
        }
    }
}

impl Validatable for MigrationsConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.database_url, "database_url", self.domain_name())?;
        validate_required_string(&self.source_url, "source_url", self.domain_name())?;
        validate_enum_choice(&self.direction, &DIRECTIONS, "direction", self.domain_name())?;

        if self.direction.trim().eq_ignore_ascii_case("down") && self.steps < 0 {
            log::warn!("Configured to revert every applied migration");
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "migrations"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = MigrationsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.direction, "up");
        assert_eq!(config.steps, -1);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = MigrationsConfig::default();
        config.direction = "sideways".to_string();
        assert!(config.validate().is_err());

        let mut config = MigrationsConfig::default();
        config.database_url = String::new();
        assert!(config.validate().is_err());

        let mut config = MigrationsConfig::default();
        config.source_url = " ".to_string();
        assert!(config.validate().is_err());
    }
}
