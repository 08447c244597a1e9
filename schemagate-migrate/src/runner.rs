//! Directional migration runner
//!
//! Turns a [`MigrationConfig`] into exactly one engine call, treats the
//! engine's no-change outcome as success and always releases the connection.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{Direction, MigrationConfig, SchemaVersion};
use crate::engine::{EngineConnector, MigrationEngine};
use crate::error::MigrationResult;
use crate::registry::DriverRegistry;

/// The single engine operation a request resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    NoOp,
    AdvanceAll,
    RetreatAll,
    /// Signed step count: positive moves forward, negative backward
    Step(i64),
}

/// Resolve a direction and a direction-relative step count into an engine call
pub fn resolve(direction: Direction, steps: i64) -> EngineCall {
    match (direction, steps) {
        (_, 0) => EngineCall::NoOp,
        (Direction::Up, n) if n < 0 => EngineCall::AdvanceAll,
        (Direction::Down, n) if n < 0 => EngineCall::RetreatAll,
        (Direction::Up, n) => EngineCall::Step(n),
        (Direction::Down, n) => EngineCall::Step(-n),
    }
}

/// Connector that loads migrations and opens sqlx engines through a [`DriverRegistry`]
#[derive(Debug, Clone)]
pub struct SqlxConnector {
    registry: DriverRegistry,
}

impl SqlxConnector {
    pub fn new(registry: DriverRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }
}

impl Default for SqlxConnector {
    fn default() -> Self {
        Self::new(DriverRegistry::with_defaults())
    }
}

#[async_trait]
impl EngineConnector for SqlxConnector {
    async fn connect(&self, source_url: &str, database_url: &str) -> MigrationResult<Box<dyn MigrationEngine>> {
        let database = self.registry.database_for(database_url)?;
        let (source, location) = self.registry.source_for(source_url)?;

        let migrations = source.load(location).await?;
        database.open(database_url, migrations).await
    }
}

/// Runs migrations in one direction
pub struct MigrationRunner<C = SqlxConnector> {
    connector: C,
}

impl MigrationRunner {
    /// Runner using every built-in driver
    pub fn new() -> Self {
        Self::with_connector(SqlxConnector::default())
    }
}

impl Default for MigrationRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: EngineConnector> MigrationRunner<C> {
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    /// Apply or revert migrations as described by `config`
    ///
    /// Succeeds when the database is already at the requested state. Any
    /// other engine failure is returned unchanged.
    pub async fn run(&self, config: &MigrationConfig) -> MigrationResult<()> {
        let call = resolve(config.direction, config.steps);
        info!(
            direction = %config.direction,
            steps = config.steps,
            source = %config.source_url,
            "Running migrations"
        );

        let mut engine = self.connector.connect(&config.source_url, &config.database_url).await?;
        let outcome = dispatch(engine.as_mut(), call).await;
        close_engine(engine.as_mut()).await;

        match outcome {
            Err(err) if err.is_no_change() => {
                info!("Database already up to date, no migrations run");
                Ok(())
            }
            Err(err) => Err(err),
            Ok(()) => {
                info!("Migrations completed");
                Ok(())
            }
        }
    }

    /// Current schema version, `None` when nothing has been applied
    pub async fn version(&self, source_url: &str, database_url: &str) -> MigrationResult<Option<SchemaVersion>> {
        let mut engine = self.connector.connect(source_url, database_url).await?;
        let version = engine.version().await;
        close_engine(engine.as_mut()).await;
        version
    }
}

async fn dispatch(engine: &mut dyn MigrationEngine, call: EngineCall) -> MigrationResult<()> {
    debug!("Resolved engine call: {:?}", call);
    match call {
        EngineCall::NoOp => Ok(()),
        EngineCall::AdvanceAll => engine.advance_all().await,
        EngineCall::RetreatAll => engine.retreat_all().await,
        EngineCall::Step(n) => engine.step(n).await,
    }
}

/// Release the engine connection; a failure here never replaces the operation's outcome
pub(crate) async fn close_engine(engine: &mut dyn MigrationEngine) {
    if let Err(err) = engine.close().await {
        warn!("Failed to close migration engine: {}", err);
    }
}
