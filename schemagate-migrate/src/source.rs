//! Filesystem migration source
//!
//! Files follow the sqlx layout: `<VERSION>_<DESCRIPTION>.sql` for simple
//! migrations, or an `.up.sql`/`.down.sql` pair for reversible ones.

use async_trait::async_trait;
use sqlx::migrate::{Migration, Migrator};
use std::path::PathBuf;
use tracing::debug;

use crate::error::{MigrationError, MigrationResult};
use crate::registry::SourceDriver;

/// Loads migrations from a local directory
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

#[async_trait]
impl SourceDriver for FileSource {
    async fn load(&self, location: &str) -> MigrationResult<Vec<Migration>> {
        let path = PathBuf::from(location);
        debug!("Loading migrations from: {}", path.display());

        let migrator = Migrator::new(path).await.map_err(MigrationError::Source)?;

        let mut migrations: Vec<Migration> = migrator.iter().cloned().collect();
        migrations.sort_by_key(|migration| migration.version);

        debug!("Loaded {} migration files", migrations.len());
        Ok(migrations)
    }
}
