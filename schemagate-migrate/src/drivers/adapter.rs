//! Engine adapter over the sqlx migration primitives
//!
//! sqlx provides per-connection primitives (version table, dirty tracking,
//! advisory lock, transactional apply/revert). This adapter sequences them
//! into the directional operations of [`MigrationEngine`].

use async_trait::async_trait;
use sqlx::migrate::{AppliedMigration, Migrate, MigrateError, Migration};
use sqlx::Connection;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::config::{Direction, SchemaVersion};
use crate::engine::MigrationEngine;
use crate::error::{MigrationError, MigrationResult};

/// Backend-specific removal of every schema object
#[async_trait]
pub trait SchemaReset: Send {
    async fn drop_schema(&mut self) -> Result<(), sqlx::Error>;
}

/// How far to move in one direction; `None` runs to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Forward(Option<u64>),
    Backward(Option<u64>),
}

/// [`MigrationEngine`] backed by a single sqlx connection
pub struct SqlxEngine<C> {
    conn: Option<C>,
    migrations: Vec<Migration>,
}

impl<C> SqlxEngine<C>
where
    C: Connection + Migrate + SchemaReset + Send + 'static,
{
    /// Connect to `database_url` and prepare to run `migrations`
    pub async fn connect(database_url: &str, migrations: Vec<Migration>) -> MigrationResult<Self> {
        let conn = C::connect(database_url).await.map_err(MigrationError::Connection)?;
        Ok(Self::from_connection(conn, migrations))
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: C, mut migrations: Vec<Migration>) -> Self {
        migrations.sort_by_key(|migration| migration.version);
        Self {
            conn: Some(conn),
            migrations,
        }
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    async fn run(&mut self, plan: Plan) -> MigrationResult<()> {
        let conn = self.conn.as_mut().ok_or(MigrationError::Closed)?;

        conn.lock().await?;
        let outcome = execute(conn, &self.migrations, plan).await;
        let unlocked = conn.unlock().await;

        match (outcome, unlocked) {
            (Err(error), Err(unlock_error)) => {
                warn!("Failed to release migration lock: {}", unlock_error);
                Err(error)
            }
            (Err(error), Ok(())) => Err(error),
            (Ok(()), unlocked) => unlocked.map_err(MigrationError::from),
        }
    }
}

#[async_trait]
impl<C> MigrationEngine for SqlxEngine<C>
where
    C: Connection + Migrate + SchemaReset + Send + 'static,
{
    async fn advance_all(&mut self) -> MigrationResult<()> {
        self.run(Plan::Forward(None)).await
    }

    async fn retreat_all(&mut self) -> MigrationResult<()> {
        self.run(Plan::Backward(None)).await
    }

    async fn step(&mut self, n: i64) -> MigrationResult<()> {
        match n {
            0 => Err(MigrationError::NoChange),
            n if n > 0 => self.run(Plan::Forward(Some(n.unsigned_abs()))).await,
            n => self.run(Plan::Backward(Some(n.unsigned_abs()))).await,
        }
    }

    async fn drop_all(&mut self) -> MigrationResult<()> {
        let conn = self.conn.as_mut().ok_or(MigrationError::Closed)?;
        conn.drop_schema().await?;
        info!("Dropped all schema objects");
        Ok(())
    }

    async fn version(&mut self) -> MigrationResult<Option<SchemaVersion>> {
        let conn = self.conn.as_mut().ok_or(MigrationError::Closed)?;
        conn.ensure_migrations_table().await?;

        if let Some(version) = conn.dirty_version().await? {
            return Ok(Some(SchemaVersion { version, dirty: true }));
        }

        let applied = conn.list_applied_migrations().await?;
        Ok(applied
            .iter()
            .map(|migration| migration.version)
            .max()
            .map(|version| SchemaVersion { version, dirty: false }))
    }

    async fn close(&mut self) -> MigrationResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }
}

async fn execute<C>(conn: &mut C, migrations: &[Migration], plan: Plan) -> MigrationResult<()>
where
    C: Migrate + Send,
{
    conn.ensure_migrations_table().await?;

    if let Some(version) = conn.dirty_version().await? {
        return Err(MigrateError::Dirty(version).into());
    }

    let applied = conn.list_applied_migrations().await?;
    validate_applied(migrations, &applied)?;

    let applied_versions: BTreeSet<i64> = applied.iter().map(|migration| migration.version).collect();

    match plan {
        Plan::Forward(limit) => {
            let pending: Vec<&Migration> = migrations
                .iter()
                .filter(|migration| {
                    migration.migration_type.is_up_migration() && !applied_versions.contains(&migration.version)
                })
                .collect();

            apply_batch(conn, Direction::Up, pending, limit).await
        }
        Plan::Backward(limit) => {
            let take = limit.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
            let mut targets = Vec::new();

            for version in applied_versions.iter().rev().take(take) {
                let down = migrations
                    .iter()
                    .find(|migration| migration.version == *version && migration.migration_type.is_down_migration())
                    .ok_or(MigrationError::Irreversible(*version))?;
                targets.push(down);
            }

            apply_batch(conn, Direction::Down, targets, limit).await
        }
    }
}

async fn apply_batch<C>(
    conn: &mut C,
    direction: Direction,
    targets: Vec<&Migration>,
    limit: Option<u64>,
) -> MigrationResult<()>
where
    C: Migrate + Send,
{
    let available = targets.len() as u64;
    if available == 0 {
        debug!("No migrations to run {}", direction);
        return Err(MigrationError::NoChange);
    }

    let count = limit.map_or(available, |requested| requested.min(available));

    for migration in targets.into_iter().take(count as usize) {
        let elapsed = match direction {
            Direction::Up => conn.apply(migration).await?,
            Direction::Down => conn.revert(migration).await?,
        };
        info!(
            version = migration.version,
            description = %migration.description,
            elapsed_ms = elapsed.as_millis() as u64,
            "Migrated {}",
            direction
        );
    }

    match limit {
        Some(requested) if requested > available => Err(MigrationError::ShortLimit {
            requested,
            applied: available,
        }),
        _ => Ok(()),
    }
}

/// Every applied version must still exist locally with an unchanged checksum
fn validate_applied(migrations: &[Migration], applied: &[AppliedMigration]) -> MigrationResult<()> {
    for record in applied {
        let local = migrations
            .iter()
            .find(|migration| migration.version == record.version && migration.migration_type.is_up_migration());

        match local {
            None => return Err(MigrateError::VersionMissing(record.version).into()),
            Some(migration) if migration.checksum != record.checksum => {
                return Err(MigrateError::VersionMismatch(record.version).into());
            }
            Some(_) => {}
        }
    }
    Ok(())
}
