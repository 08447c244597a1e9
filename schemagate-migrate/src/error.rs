//! Migration error types

use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Result type for migration operations
pub type MigrationResult<T> = std::result::Result<T, MigrationError>;

/// Errors raised while resolving, running or resetting migrations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The database already satisfies the requested target
    #[error("no change")]
    NoChange,

    /// A bounded step ran out of migrations before reaching its limit
    #[error("short limit: requested {requested} migration steps but only {applied} were available")]
    ShortLimit { requested: u64, applied: u64 },

    /// An applied migration has no down script to revert it with
    #[error("migration {0} cannot be reverted: no down migration found")]
    Irreversible(i64),

    /// Reset was attempted against a database not named as test or demo
    #[error("cannot reset non-test database")]
    NonTestDatabase,

    /// Direction text other than "up" or "down"
    #[error("Invalid migration direction '{0}': expected 'up' or 'down'")]
    InvalidDirection(String),

    /// Locator that could not be interpreted
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// No database driver registered for the scheme
    #[error("Unsupported database scheme: {0}")]
    UnsupportedDatabase(String),

    /// No migration source registered for the scheme
    #[error("Unsupported migration source scheme: {0}")]
    UnsupportedSource(String),

    /// Database could not be reached
    #[error("Database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Migration files could not be read or parsed
    #[error("Failed to load migrations: {0}")]
    Source(#[source] MigrateError),

    /// Failure reported by the migration engine (dirty state, checksum drift, ...)
    #[error("Migration failed: {0}")]
    Engine(#[from] MigrateError),

    /// Query failure outside of a migration script
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Engine used after its connection was released
    #[error("Migration engine connection already closed")]
    Closed,

    /// Blocking runtime could not be started
    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl MigrationError {
    /// Whether this is the "already at the requested state" outcome
    pub fn is_no_change(&self) -> bool {
        matches!(self, MigrationError::NoChange)
    }

    /// Whether this error came from the reset naming guard
    pub fn is_guard_rejection(&self) -> bool {
        matches!(self, MigrationError::NonTestDatabase)
    }

    /// Get error code for reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            MigrationError::NoChange => "NO_CHANGE",
            MigrationError::ShortLimit { .. } => "SHORT_LIMIT",
            MigrationError::Irreversible(_) => "IRREVERSIBLE",
            MigrationError::NonTestDatabase => "NON_TEST_DATABASE",
            MigrationError::InvalidDirection(_) => "INVALID_DIRECTION",
            MigrationError::InvalidUrl(_) => "INVALID_URL",
            MigrationError::UnsupportedDatabase(_) | MigrationError::UnsupportedSource(_) => "UNSUPPORTED_SCHEME",
            MigrationError::Connection(_) => "CONNECTION_ERROR",
            MigrationError::Source(_) => "SOURCE_ERROR",
            MigrationError::Engine(MigrateError::Dirty(_)) => "DIRTY_DATABASE",
            MigrationError::Engine(_) => "MIGRATION_ERROR",
            MigrationError::Database(_) => "DATABASE_ERROR",
            MigrationError::Closed => "CLOSED",
            MigrationError::Runtime(_) => "RUNTIME_ERROR",
        }
    }
}
