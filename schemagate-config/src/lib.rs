//! Domain-driven configuration for schemagate
//!
//! Configuration is split by domain (migrations, reset, logging), loaded
//! from YAML or JSON and overridden by `SCHEMAGATE_*` environment variables.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

pub use domains::{
    logging::{LogFormat, LogLevel, LoggingConfig},
    migrations::MigrationsConfig,
    reset::ResetConfig,
    SchemagateConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
