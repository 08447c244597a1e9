//! SQLite driver

use async_trait::async_trait;
use sqlx::migrate::Migration;
use sqlx::SqliteConnection;
use tracing::debug;

use super::{quote_identifier, SchemaReset, SqlxEngine};
use crate::engine::MigrationEngine;
use crate::error::MigrationResult;
use crate::registry::DatabaseDriver;

const LIST_TABLES: &str = "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'";

/// Opens migration engines for `sqlite:` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    async fn open(&self, database_url: &str, migrations: Vec<Migration>) -> MigrationResult<Box<dyn MigrationEngine>> {
        let engine = SqlxEngine::<SqliteConnection>::connect(database_url, migrations).await?;
        Ok(Box::new(engine))
    }
}

#[async_trait]
impl SchemaReset for SqliteConnection {
    async fn drop_schema(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&mut *self).await?;
        let dropped = drop_tables(self).await;
        sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *self).await?;
        dropped?;

        // reclaim the file space left by the dropped tables
        sqlx::query("VACUUM").execute(&mut *self).await?;
        Ok(())
    }
}

async fn drop_tables(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let tables: Vec<String> = sqlx::query_scalar(LIST_TABLES).fetch_all(&mut *conn).await?;

    for table in tables {
        debug!("Dropping table: {}", table);
        let statement = format!("DROP TABLE IF EXISTS {}", quote_identifier(&table));
        sqlx::query(&statement).execute(&mut *conn).await?;
    }

    Ok(())
}
