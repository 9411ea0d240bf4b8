//! Generator configuration.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Configuration for migration generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Reject schema sequences whose shared columns change definition.
    pub verify_constraints: bool,

    /// Reject multi-column indexes instead of planning only their first column.
    pub strict_indexes: bool,

    /// Prefix of generated migration names, e.g. `Migrate` in `MigrateV1ToV2`.
    pub migration_name_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            verify_constraints: true,
            strict_indexes: false,
            migration_name_prefix: "Migrate".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Set whether the constraint verifier runs before planning.
    pub fn with_verify_constraints(mut self, verify: bool) -> Self {
        self.verify_constraints = verify;
        self
    }

    /// Set strict index mode.
    pub fn with_strict_indexes(mut self, strict: bool) -> Self {
        self.strict_indexes = strict;
        self
    }

    /// Set the migration name prefix.
    pub fn with_migration_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.migration_name_prefix = prefix.into();
        self
    }

    /// Load a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Render the migration name for a version transition.
    pub fn migration_name(&self, from_version: u32, to_version: u32) -> String {
        format!(
            "{}V{}ToV{}",
            self.migration_name_prefix, from_version, to_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();

        assert!(config.verify_constraints);
        assert!(!config.strict_indexes);
        assert_eq!(config.migration_name(1, 2), "MigrateV1ToV2");
    }

    #[test]
    fn test_builder() {
        let config = GeneratorConfig::default()
            .with_verify_constraints(false)
            .with_strict_indexes(true)
            .with_migration_name_prefix("Upgrade");

        assert!(!config.verify_constraints);
        assert!(config.strict_indexes);
        assert_eq!(config.migration_name(4, 5), "UpgradeV4ToV5");
    }

    #[test]
    fn test_from_json_partial() {
        let config = GeneratorConfig::from_json(r#"{ "strict_indexes": true }"#).unwrap();

        assert!(config.strict_indexes);
        assert!(config.verify_constraints);
        assert_eq!(config.migration_name_prefix, "Migrate");
    }

    #[test]
    fn test_from_json_invalid() {
        let err = GeneratorConfig::from_json("{ strict_indexes: ").unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
