//! Destructive reset configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::validation::Validatable;

/// Which databases may be wiped by `reset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// A connection string must contain one of these to be reset
    pub allowed_markers: Vec<String>,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            allowed_markers: vec!["_test".to_string(), "_demo".to_string()],
        }
    }
}

impl Validatable for ResetConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.allowed_markers.is_empty() {
            return Err(self.validation_error("allowed_markers must contain at least one marker"));
        }

        // an empty marker would match every connection string
        if self.allowed_markers.iter().any(|marker| marker.trim().is_empty()) {
            return Err(self.validation_error("allowed_markers cannot contain empty markers"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "reset"
    }
}
