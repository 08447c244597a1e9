//! Guarded destructive reset
//!
//! Dropping every table is only allowed when the connection string names a
//! test or demo database. The check is a naming convention, not access control.

use tracing::{info, warn};

use crate::engine::EngineConnector;
use crate::error::{MigrationError, MigrationResult};
use crate::registry::file_uri;
use crate::runner::{close_engine, SqlxConnector};

/// Substrings that mark a connection string as non-production
pub const DEFAULT_RESET_MARKERS: [&str; 2] = ["_test", "_demo"];

/// Decides whether a connection string may be reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGuard {
    markers: Vec<String>,
}

impl Default for ResetGuard {
    fn default() -> Self {
        Self::with_markers(DEFAULT_RESET_MARKERS)
    }
}

impl ResetGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard accepting the given markers
    ///
    /// Blank markers are ignored since they would match any connection
    /// string. When nothing usable remains the default markers apply.
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers
            .into_iter()
            .map(Into::into)
            .filter(|marker| !marker.trim().is_empty())
            .collect();

        if markers.is_empty() {
            return Self::default();
        }
        Self { markers }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Accept `connection_string` only if it contains one of the markers
    pub fn check(&self, connection_string: &str) -> MigrationResult<()> {
        if self
            .markers
            .iter()
            .any(|marker| connection_string.contains(marker.as_str()))
        {
            Ok(())
        } else {
            warn!("Refusing to reset a database not marked as test or demo");
            Err(MigrationError::NonTestDatabase)
        }
    }
}

/// Drops all data from test and demo databases
pub struct DataResetter<C = SqlxConnector> {
    connector: C,
    guard: ResetGuard,
}

impl DataResetter {
    /// Resetter using every built-in driver and the default markers
    pub fn new() -> Self {
        Self::with_connector(SqlxConnector::default())
    }
}

impl Default for DataResetter {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: EngineConnector> DataResetter<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            guard: ResetGuard::default(),
        }
    }

    pub fn with_guard(mut self, guard: ResetGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &ResetGuard {
        &self.guard
    }

    /// Drop every table, version tracking included
    ///
    /// The database is never contacted when the guard rejects `connection_string`.
    pub async fn reset(&self, source_url: &str, connection_string: &str) -> MigrationResult<()> {
        self.guard.check(connection_string)?;

        let source = file_uri(source_url);
        let mut engine = self.connector.connect(&source, connection_string).await?;
        let outcome = engine.drop_all().await;
        close_engine(engine.as_mut()).await;

        if outcome.is_ok() {
            info!("Reset all data");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MigrationEngine, MockEngineConnector, MockMigrationEngine};
    use mockall::predicate::eq;

    fn dropping_connector(database_url: &'static str) -> MockEngineConnector {
        let mut engine = MockMigrationEngine::new();
        engine.expect_drop_all().times(1).returning(|| Ok(()));
        engine.expect_close().times(1).returning(|| Ok(()));

        let mut connector = MockEngineConnector::new();
        connector
            .expect_connect()
            .with(eq("file:///migrations"), eq(database_url))
            .times(1)
            .return_once(move |_, _| Ok(Box::new(engine) as Box<dyn MigrationEngine>));
        connector
    }

    #[test]
    fn test_guard_markers() {
        let guard = ResetGuard::new();
        assert!(guard.check("postgres://user@host/myapp_test").is_ok());
        assert!(guard.check("postgres://user@host/myapp_test_demo").is_ok());
        assert!(guard.check("sqlite://data/shop_demo.db").is_ok());

        let err = guard.check("postgres://user@host/myapp_prod").unwrap_err();
        assert!(err.is_guard_rejection());
        assert_eq!(err.to_string(), "cannot reset non-test database");
    }

    #[test]
    fn test_guard_never_without_markers() {
        assert_eq!(ResetGuard::with_markers(Vec::<String>::new()), ResetGuard::default());
        assert_eq!(ResetGuard::with_markers(["", "  "]), ResetGuard::default());

        let guard = ResetGuard::with_markers(["_test", "_staging"]);
        assert_eq!(guard.markers(), ["_test".to_string(), "_staging".to_string()]);
        assert!(guard.check("postgres://host/app_staging").is_ok());
        assert!(guard.check("postgres://host/app_demo").is_err());
    }

    #[tokio::test]
    async fn test_reset_test_database() {
        let resetter = DataResetter::with_connector(dropping_connector("postgres://user@host/myapp_test"));
        resetter
            .reset("/migrations", "postgres://user@host/myapp_test")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_demo_database() {
        let resetter = DataResetter::with_connector(dropping_connector("postgres://user@host/myapp_test_demo"));
        resetter
            .reset("/migrations", "postgres://user@host/myapp_test_demo")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_keeps_existing_source_scheme() {
        let resetter = DataResetter::with_connector(dropping_connector("sqlite://app_test.db"));
        resetter
            .reset("file:///migrations", "sqlite://app_test.db")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_production_never_connects() {
        let mut connector = MockEngineConnector::new();
        connector.expect_connect().never();
        let resetter = DataResetter::with_connector(connector);

        let err = resetter
            .reset("/migrations", "postgres://user@host/myapp_prod")
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::NonTestDatabase));
    }

    #[tokio::test]
    async fn test_reset_propagates_drop_failure_and_closes() {
        let mut engine = MockMigrationEngine::new();
        engine
            .expect_drop_all()
            .returning(|| Err(MigrationError::Database(sqlx::Error::PoolClosed)));
        engine.expect_close().times(1).returning(|| Ok(()));

        let mut connector = MockEngineConnector::new();
        connector
            .expect_connect()
            .return_once(move |_, _| Ok(Box::new(engine) as Box<dyn MigrationEngine>));
        let resetter = DataResetter::with_connector(connector);

        let err = resetter
            .reset("/migrations", "sqlite://app_test.db")
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Database(sqlx::Error::PoolClosed)));
    }
}
