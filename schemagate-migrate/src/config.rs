//! Migration request types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MigrationError;

/// Migration direction (up or down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(MigrationError::InvalidDirection(s.to_string())),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = MigrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.as_str().to_string()
    }
}

/// A single migration request
///
/// `steps` is read relative to `direction`: `0` does nothing, a negative
/// count runs every remaining migration and a positive count runs exactly
/// that many. `Down` with `steps = 3` moves three migrations backward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// up or down
    pub direction: Direction,

    /// Number of migration steps, all if < 0, n if > 0, nothing if 0
    pub steps: i64,

    /// Database connection string
    pub database_url: String,

    /// Directory or URL containing migration files
    pub source_url: String,
}

impl MigrationConfig {
    pub fn new(
        direction: Direction,
        steps: i64,
        database_url: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            steps,
            database_url: database_url.into(),
            source_url: source_url.into(),
        }
    }

    /// Run every pending migration forward
    pub fn up_all(database_url: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self::new(Direction::Up, -1, database_url, source_url)
    }

    /// Revert every applied migration
    pub fn down_all(database_url: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self::new(Direction::Down, -1, database_url, source_url)
    }
}

/// Current schema version as recorded by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub version: i64,
    /// A migration started but never completed
    pub dirty: bool,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dirty {
            write!(f, "{} (dirty)", self.version)
        } else {
            write!(f, "{}", self.version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_str() {
        assert_eq!(Direction::from_str("up").unwrap(), Direction::Up);
        assert_eq!(Direction::from_str("DOWN").unwrap(), Direction::Down);
        assert_eq!(Direction::from_str(" Up ").unwrap(), Direction::Up);
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let err = Direction::from_str("sideways").unwrap_err();
        assert!(matches!(err, MigrationError::InvalidDirection(ref d) if d == "sideways"));
        assert!(Direction::from_str("").is_err());
    }

    #[test]
    fn test_direction_serde() {
        let config: MigrationConfig = serde_json::from_str(
            r#"{"direction":"down","steps":2,"database_url":"sqlite://a_test.db","source_url":"migrations"}"#,
        )
        .unwrap();
        assert_eq!(config.direction, Direction::Down);
        assert_eq!(config.steps, 2);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""direction":"down""#));

        let invalid = serde_json::from_str::<MigrationConfig>(
            r#"{"direction":"left","steps":1,"database_url":"x","source_url":"y"}"#,
        );
        assert!(invalid.is_err());
    }

    #[test]
    fn test_schema_version_display() {
        let clean = SchemaVersion { version: 20240101, dirty: false };
        let dirty = SchemaVersion { version: 3, dirty: true };
        assert_eq!(clean.to_string(), "20240101");
        assert_eq!(dirty.to_string(), "3 (dirty)");
    }
}
