//! Explicit scheme registry for database drivers and migration sources

use async_trait::async_trait;
use sqlx::migrate::Migration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::engine::MigrationEngine;
use crate::error::{MigrationError, MigrationResult};

/// Scheme used for bare filesystem paths
pub const FILE_SCHEME: &str = "file";

/// Opens an engine for a database URL once migrations are loaded
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    async fn open(&self, database_url: &str, migrations: Vec<Migration>) -> MigrationResult<Box<dyn MigrationEngine>>;
}

/// Loads migration definitions from a location
#[async_trait]
pub trait SourceDriver: Send + Sync {
    async fn load(&self, location: &str) -> MigrationResult<Vec<Migration>>;
}

/// Maps URL schemes to drivers
///
/// Nothing is registered implicitly: build one with [`DriverRegistry::with_defaults`]
/// or register drivers by hand.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    databases: HashMap<String, Arc<dyn DatabaseDriver>>,
    sources: HashMap<String, Arc<dyn SourceDriver>>,
}

impl DriverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in file source and every compiled-in database driver
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new().register_source(FILE_SCHEME, crate::source::FileSource);

        #[cfg(feature = "postgres")]
        {
            registry = registry
                .register_database("postgres", crate::drivers::PostgresDriver)
                .register_database("postgresql", crate::drivers::PostgresDriver);
        }

        #[cfg(feature = "sqlite")]
        {
            registry = registry.register_database("sqlite", crate::drivers::SqliteDriver);
        }

        registry
    }

    /// Register a database driver for a scheme, replacing any previous one
    pub fn register_database(mut self, scheme: impl Into<String>, driver: impl DatabaseDriver + 'static) -> Self {
        let scheme = scheme.into().to_lowercase();
        debug!("Registering database driver for scheme: {}", scheme);
        self.databases.insert(scheme, Arc::new(driver));
        self
    }

    /// Register a migration source for a scheme, replacing any previous one
    pub fn register_source(mut self, scheme: impl Into<String>, source: impl SourceDriver + 'static) -> Self {
        let scheme = scheme.into().to_lowercase();
        debug!("Registering migration source for scheme: {}", scheme);
        self.sources.insert(scheme, Arc::new(source));
        self
    }

    pub fn database(&self, scheme: &str) -> Option<Arc<dyn DatabaseDriver>> {
        self.databases.get(&scheme.to_lowercase()).cloned()
    }

    pub fn source(&self, scheme: &str) -> Option<Arc<dyn SourceDriver>> {
        self.sources.get(&scheme.to_lowercase()).cloned()
    }

    /// Driver for a database URL, chosen by its scheme
    pub fn database_for(&self, database_url: &str) -> MigrationResult<Arc<dyn DatabaseDriver>> {
        let scheme = scheme_of(database_url).ok_or_else(|| MigrationError::InvalidUrl(database_url.to_string()))?;
        self.database(scheme)
            .ok_or_else(|| MigrationError::UnsupportedDatabase(scheme.to_string()))
    }

    /// Source driver and scheme-less location for a source URL
    ///
    /// A locator without a scheme is treated as a filesystem path.
    pub fn source_for<'a>(&self, source_url: &'a str) -> MigrationResult<(Arc<dyn SourceDriver>, &'a str)> {
        let (scheme, location) = match scheme_of(source_url) {
            Some(scheme) => (scheme, strip_scheme(source_url, scheme)),
            None => (FILE_SCHEME, source_url),
        };

        let driver = self
            .source(scheme)
            .ok_or_else(|| MigrationError::UnsupportedSource(scheme.to_string()))?;
        Ok((driver, location))
    }

    pub fn database_schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.databases.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

/// Scheme of a URL-like locator
///
/// Single-letter prefixes are not treated as schemes so Windows drive paths
/// such as `C:\migrations` stay paths.
pub fn scheme_of(locator: &str) -> Option<&str> {
    let (scheme, _) = locator.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;

    if scheme.len() < 2
        || !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }

    Some(scheme)
}

fn strip_scheme<'a>(locator: &'a str, scheme: &str) -> &'a str {
    let rest = &locator[scheme.len() + 1..];
    rest.strip_prefix("//").unwrap_or(rest)
}

/// Normalise a migration source into a `file://` URI
///
/// Locators that already carry a scheme are returned unchanged.
pub fn file_uri(source_url: &str) -> String {
    match scheme_of(source_url) {
        Some(_) => source_url.to_string(),
        None => format!("{}://{}", FILE_SCHEME, source_url),
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sources: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        sources.sort_unstable();
        f.debug_struct("DriverRegistry")
            .field("databases", &self.database_schemes())
            .field("sources", &sources)
            .finish()
    }
}
