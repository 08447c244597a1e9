//! End-to-end runner and reset behaviour against SQLite files

use schemagate_migrate::{
    reset_all_data, run_migrations, schema_version, DataResetter, Direction, MigrationConfig, MigrationError,
    MigrationRunner, SchemaVersion,
};
use sqlx::migrate::MigrateError;
use sqlx::{Connection, SqliteConnection};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MIGRATIONS: [(&str, &str, &str); 3] = [
    (
        "1_users",
        "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL);",
        "DROP TABLE users;",
    ),
    (
        "2_posts",
        "CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id), body TEXT);",
        "DROP TABLE posts;",
    ),
    (
        "3_tags",
        "CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);",
        "DROP TABLE tags;",
    ),
];

struct Fixture {
    dir: TempDir,
    migrations: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let migrations = dir.path().join("migrations");
        fs::create_dir(&migrations).unwrap();

        for (name, up, down) in MIGRATIONS {
            fs::write(migrations.join(format!("{name}.up.sql")), up).unwrap();
            fs::write(migrations.join(format!("{name}.down.sql")), down).unwrap();
        }

        Self { dir, migrations }
    }

    fn source(&self) -> String {
        self.migrations.to_str().unwrap().to_string()
    }

    fn database_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn database_url(&self, name: &str) -> String {
        sqlite_url(&self.database_path(name))
    }

    fn config(&self, direction: Direction, steps: i64) -> MigrationConfig {
        MigrationConfig::new(direction, steps, self.database_url("app_test.db"), self.source())
    }

    async fn version(&self) -> Option<SchemaVersion> {
        MigrationRunner::new()
            .version(&self.source(), &self.database_url("app_test.db"))
            .await
            .unwrap()
    }

    async fn tables(&self) -> Vec<String> {
        let mut conn = SqliteConnection::connect(&self.database_url("app_test.db")).await.unwrap();
        let tables = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&mut conn)
        .await
        .unwrap();
        conn.close().await.unwrap();
        tables
    }
}

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

fn clean(version: i64) -> Option<SchemaVersion> {
    Some(SchemaVersion { version, dirty: false })
}

#[tokio::test]
async fn test_up_partial_then_all() {
    let fixture = Fixture::new();
    let runner = MigrationRunner::new();

    runner.run(&fixture.config(Direction::Up, 2)).await.unwrap();
    assert_eq!(fixture.version().await, clean(2));
    assert_eq!(fixture.tables().await, ["_sqlx_migrations", "posts", "users"]);

    runner.run(&fixture.config(Direction::Up, -1)).await.unwrap();
    assert_eq!(fixture.version().await, clean(3));
    assert!(fixture.tables().await.contains(&"tags".to_string()));
}

#[tokio::test]
async fn test_up_is_idempotent() {
    let fixture = Fixture::new();
    let runner = MigrationRunner::new();

    runner.run(&fixture.config(Direction::Up, -1)).await.unwrap();
    runner.run(&fixture.config(Direction::Up, -1)).await.unwrap();
    runner.run(&fixture.config(Direction::Up, 1)).await.unwrap();
    assert_eq!(fixture.version().await, clean(3));
}

#[tokio::test]
async fn test_zero_steps_leaves_database_untouched() {
    let fixture = Fixture::new();
    let runner = MigrationRunner::new();

    runner.run(&fixture.config(Direction::Up, 0)).await.unwrap();
    assert!(!fixture.tables().await.contains(&"users".to_string()));
}

#[tokio::test]
async fn test_down_partial_then_all() {
    let fixture = Fixture::new();
    let runner = MigrationRunner::new();
    runner.run(&fixture.config(Direction::Up, -1)).await.unwrap();

    runner.run(&fixture.config(Direction::Down, 1)).await.unwrap();
    assert_eq!(fixture.version().await, clean(2));
    assert!(!fixture.tables().await.contains(&"tags".to_string()));

    runner.run(&fixture.config(Direction::Down, -1)).await.unwrap();
    assert_eq!(fixture.version().await, None);
    assert_eq!(fixture.tables().await, ["_sqlx_migrations"]);

    // nothing left to revert
    runner.run(&fixture.config(Direction::Down, -1)).await.unwrap();
}

#[tokio::test]
async fn test_short_limit_applies_what_is_available() {
    let fixture = Fixture::new();
    let runner = MigrationRunner::new();

    let err = runner.run(&fixture.config(Direction::Up, 5)).await.unwrap_err();
    assert!(matches!(err, MigrationError::ShortLimit { requested: 5, applied: 3 }));
    assert_eq!(fixture.version().await, clean(3));

    let err = runner.run(&fixture.config(Direction::Down, 4)).await.unwrap_err();
    assert!(matches!(err, MigrationError::ShortLimit { requested: 4, applied: 3 }));
    assert_eq!(fixture.version().await, None);
}

#[tokio::test]
async fn test_dirty_database_is_rejected() {
    let fixture = Fixture::new();
    let runner = MigrationRunner::new();
    runner.run(&fixture.config(Direction::Up, 1)).await.unwrap();

    let mut conn = SqliteConnection::connect(&fixture.database_url("app_test.db")).await.unwrap();
    sqlx::query(
        "INSERT INTO _sqlx_migrations (version, description, success, checksum, execution_time) \
         VALUES (2, 'posts', FALSE, X'00', -1)",
    )
    .execute(&mut conn)
    .await
    .unwrap();
    conn.close().await.unwrap();

    let err = runner.run(&fixture.config(Direction::Up, -1)).await.unwrap_err();
    assert!(matches!(err, MigrationError::Engine(MigrateError::Dirty(2))));
    assert_eq!(err.error_code(), "DIRTY_DATABASE");
    assert_eq!(fixture.version().await, Some(SchemaVersion { version: 2, dirty: true }));
}

#[tokio::test]
async fn test_checksum_drift_is_rejected() {
    let fixture = Fixture::new();
    let runner = MigrationRunner::new();
    runner.run(&fixture.config(Direction::Up, 1)).await.unwrap();

    fs::write(
        fixture.migrations.join("1_users.up.sql"),
        "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT, name TEXT);",
    )
    .unwrap();

    let err = runner.run(&fixture.config(Direction::Up, -1)).await.unwrap_err();
    assert!(matches!(err, MigrationError::Engine(MigrateError::VersionMismatch(1))));
}

#[tokio::test]
async fn test_missing_down_script_is_irreversible() {
    let fixture = Fixture::new();
    fs::write(fixture.migrations.join("4_audit.sql"), "CREATE TABLE audit (id INTEGER);").unwrap();
    let runner = MigrationRunner::new();
    runner.run(&fixture.config(Direction::Up, -1)).await.unwrap();

    let err = runner.run(&fixture.config(Direction::Down, 1)).await.unwrap_err();
    assert!(matches!(err, MigrationError::Irreversible(4)));
    assert_eq!(fixture.version().await, clean(4));
}

#[tokio::test]
async fn test_reset_drops_every_table() {
    let fixture = Fixture::new();
    MigrationRunner::new()
        .run(&fixture.config(Direction::Up, -1))
        .await
        .unwrap();

    DataResetter::new()
        .reset(&fixture.source(), &fixture.database_url("app_test.db"))
        .await
        .unwrap();

    assert!(fixture.tables().await.is_empty());
}

#[tokio::test]
async fn test_reset_rejects_production_before_connecting() {
    let fixture = Fixture::new();
    let path = fixture.database_path("app_prod.db");

    let err = DataResetter::new()
        .reset(&fixture.source(), &sqlite_url(&path))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::NonTestDatabase));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_unknown_database_scheme() {
    let fixture = Fixture::new();
    let config = MigrationConfig::up_all("mysql://localhost/app_test", fixture.source());

    let err = MigrationRunner::new().run(&config).await.unwrap_err();
    assert!(matches!(err, MigrationError::UnsupportedDatabase(ref s) if s == "mysql"));
}

#[test]
fn test_blocking_facade() {
    let fixture = Fixture::new();
    let database_url = fixture.database_url("app_demo.db");

    run_migrations(&MigrationConfig::up_all(&database_url, fixture.source())).unwrap();
    assert_eq!(schema_version(&fixture.source(), &database_url).unwrap(), clean(3));

    run_migrations(&MigrationConfig::new(Direction::Down, 2, &database_url, fixture.source())).unwrap();
    assert_eq!(schema_version(&fixture.source(), &database_url).unwrap(), clean(1));

    reset_all_data(&fixture.source(), &database_url).unwrap();
    assert_eq!(schema_version(&fixture.source(), &database_url).unwrap(), None);
}
