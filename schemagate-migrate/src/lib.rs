//! Directional schema migrations and guarded data reset for schemagate
//!
//! Two independent entry points sit on top of a pluggable migration engine:
//!
//! - the migration runner moves a database up or down by a number of steps,
//!   treating "already at the requested state" as success
//! - the reset guard drops every table, but only for connection strings that
//!   name a test or demo database
//!
//! The functions at the crate root block the calling thread. Callers that
//! already run inside a tokio runtime use [`MigrationRunner`] and
//! [`DataResetter`] directly.

pub mod config;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod registry;
pub mod reset;
pub mod runner;
pub mod source;

// Mock engine and connector for downstream tests
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    pub use crate::engine::{MockEngineConnector, MockMigrationEngine};
}

use std::future::Future;

pub use config::{Direction, MigrationConfig, SchemaVersion};
pub use engine::{EngineConnector, MigrationEngine};
pub use error::{MigrationError, MigrationResult};
pub use registry::{DatabaseDriver, DriverRegistry, SourceDriver};
pub use reset::{DataResetter, ResetGuard, DEFAULT_RESET_MARKERS};
pub use runner::{resolve, EngineCall, MigrationRunner, SqlxConnector};

/// Run migrations as described by `config`, blocking until they finish
///
/// Must not be called from within an async runtime.
pub fn run_migrations(config: &MigrationConfig) -> MigrationResult<()> {
    block_on(MigrationRunner::new().run(config))?
}

/// Drop every table of a test or demo database, blocking until done
///
/// Rejects with [`MigrationError::NonTestDatabase`] before connecting when
/// `connection_string` contains neither `_test` nor `_demo`.
pub fn reset_all_data(source_url: &str, connection_string: &str) -> MigrationResult<()> {
    block_on(DataResetter::new().reset(source_url, connection_string))?
}

/// Current schema version of `database_url`, blocking until known
pub fn schema_version(source_url: &str, database_url: &str) -> MigrationResult<Option<SchemaVersion>> {
    block_on(MigrationRunner::new().version(source_url, database_url))?
}

fn block_on<F: Future>(future: F) -> MigrationResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(MigrationError::Runtime)?;
    Ok(runtime.block_on(future))
}
