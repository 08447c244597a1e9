//! PostgreSQL driver

use async_trait::async_trait;
use sqlx::migrate::Migration;
use sqlx::PgConnection;
use tracing::debug;

use super::{quote_identifier, SchemaReset, SqlxEngine};
use crate::engine::MigrationEngine;
use crate::error::MigrationResult;
use crate::registry::DatabaseDriver;

const LIST_TABLES: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'";

/// Opens migration engines for `postgres://` and `postgresql://` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    async fn open(&self, database_url: &str, migrations: Vec<Migration>) -> MigrationResult<Box<dyn MigrationEngine>> {
        let engine = SqlxEngine::<PgConnection>::connect(database_url, migrations).await?;
        Ok(Box::new(engine))
    }
}

#[async_trait]
impl SchemaReset for PgConnection {
    /// Drops every base table in the current schema, version table included
    async fn drop_schema(&mut self) -> Result<(), sqlx::Error> {
        let tables: Vec<String> = sqlx::query_scalar(LIST_TABLES).fetch_all(&mut *self).await?;

        for table in tables {
            debug!("Dropping table: {}", table);
            let statement = format!("DROP TABLE IF EXISTS {} CASCADE", quote_identifier(&table));
            sqlx::query(&statement).execute(&mut *self).await?;
        }

        Ok(())
    }
}
