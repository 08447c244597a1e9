//! Migration engine contract
//!
//! The runner and the reset guard only talk to the engine through these two
//! traits, so the policy code can be exercised against mocks and the sqlx
//! adapter can be swapped for another backend.

use async_trait::async_trait;

use crate::config::SchemaVersion;
use crate::error::MigrationResult;

/// Operations offered by a connected migration engine
///
/// Stepping operations report [`MigrationError::NoChange`](crate::MigrationError::NoChange)
/// when the database is already at the requested state.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MigrationEngine: Send {
    /// Apply every pending migration
    async fn advance_all(&mut self) -> MigrationResult<()>;

    /// Revert every applied migration
    async fn retreat_all(&mut self) -> MigrationResult<()>;

    /// Move `n` migrations: forward when positive, backward when negative
    async fn step(&mut self, n: i64) -> MigrationResult<()>;

    /// Remove every table, including version tracking
    async fn drop_all(&mut self) -> MigrationResult<()>;

    /// Currently applied version, `None` when nothing has been applied
    async fn version(&mut self) -> MigrationResult<Option<SchemaVersion>>;

    /// Release the underlying connection
    async fn close(&mut self) -> MigrationResult<()>;
}

/// Opens migration engines for a source and a database target
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EngineConnector: Send + Sync {
    async fn connect(&self, source_url: &str, database_url: &str) -> MigrationResult<Box<dyn MigrationEngine>>;
}
