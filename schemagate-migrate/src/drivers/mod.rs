//! Database drivers built on the sqlx engine adapter

mod adapter;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use adapter::{SchemaReset, SqlxEngine};

#[cfg(feature = "postgres")]
pub use postgres::PostgresDriver;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;

/// Quote an identifier for interpolation into DDL
#[cfg(any(feature = "postgres", feature = "sqlite"))]
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
