//! Column definition drift checks across a schema sequence.
//!
//! SQLite cannot change a column's type or constraints in place, so a column
//! that survives from one version to the next must render to exactly the same
//! definition. The verifier walks every consecutive pair and collects all
//! drifted columns before failing.

use super::diff::{common_columns, common_tables};
use super::error::MigrationError;
use super::rename::RenameRegistry;
use crate::catalog::SchemaVersion;
use std::fmt;
use tracing::debug;

/// A column whose rendered definition changed between two versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Logical table name in the target version.
    pub table_name: String,
    /// Logical column name.
    pub column_name: String,
    /// Source schema version.
    pub from_version: u32,
    /// Target schema version.
    pub to_version: u32,
    /// Rendered definition in the source version.
    pub from_definition: String,
    /// Rendered definition in the target version.
    pub to_definition: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} changed from `{}` (v{}) to `{}` (v{})",
            self.table_name,
            self.column_name,
            self.from_definition,
            self.from_version,
            self.to_definition,
            self.to_version
        )
    }
}

/// Checks that shared columns keep identical definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintVerifier<'a> {
    renames: Option<&'a RenameRegistry>,
}

impl<'a> ConstraintVerifier<'a> {
    /// Create a verifier that matches tables by name only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match renamed tables through the given registry.
    pub fn with_renames(mut self, renames: &'a RenameRegistry) -> Self {
        self.renames = Some(renames);
        self
    }

    /// Collect every violation across consecutive pairs of `schemas`.
    ///
    /// `schemas` must already be sorted by version.
    pub fn violations(&self, schemas: &[SchemaVersion]) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for window in schemas.windows(2) {
            let (from, to) = (&window[0], &window[1]);
            let mapping = self
                .renames
                .and_then(|r| r.resolve(from.version, to.version));

            for pair in common_tables(from, to, mapping) {
                for (prev, cur) in common_columns(pair.from, pair.to) {
                    if prev.is_equivalent(cur) {
                        continue;
                    }
                    violations.push(ConstraintViolation {
                        table_name: pair.to.name.clone(),
                        column_name: cur.name.clone(),
                        from_version: from.version,
                        to_version: to.version,
                        from_definition: prev.sql_definition(),
                        to_definition: cur.sql_definition(),
                    });
                }
            }
        }

        violations
    }

    /// Fail with every violation if any column drifted.
    pub fn verify(&self, schemas: &[SchemaVersion]) -> Result<(), MigrationError> {
        let violations = self.violations(schemas);
        debug!(
            versions = schemas.len(),
            violations = violations.len(),
            "Verified column definitions"
        );

        if violations.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::ConstraintViolations(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, StorageType, TableDef};
    use crate::migration::rename::RenameMapping;

    fn employee(name: ColumnDef) -> TableDef {
        TableDef::new("Employee")
            .with_column(ColumnDef::id("id"))
            .with_column(name)
    }

    #[test]
    fn test_identical_columns_pass() {
        let column = || ColumnDef::new("name", StorageType::Text).not_null();
        let schemas = vec![
            SchemaVersion::new(1, "ns").with_table(employee(column())),
            SchemaVersion::new(2, "ns").with_table(employee(column())),
            SchemaVersion::new(3, "ns").with_table(
                employee(column()).with_column(ColumnDef::new("age", StorageType::Integer)),
            ),
        ];

        assert!(ConstraintVerifier::new().verify(&schemas).is_ok());
    }

    #[test]
    fn test_constraint_change_is_reported() {
        let schemas = vec![
            SchemaVersion::new(1, "ns")
                .with_table(employee(ColumnDef::new("name", StorageType::Text))),
            SchemaVersion::new(2, "ns")
                .with_table(employee(ColumnDef::new("name", StorageType::Text).not_null())),
        ];

        let violations = ConstraintVerifier::new().violations(&schemas);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.table_name, "Employee");
        assert_eq!(v.column_name, "name");
        assert_eq!((v.from_version, v.to_version), (1, 2));
        assert_eq!(v.to_definition, "\"name\" TEXT NOT NULL");
        assert!(v.to_string().starts_with("Employee.name changed"));
    }

    #[test]
    fn test_all_violations_are_collected() {
        let schemas = vec![
            SchemaVersion::new(1, "ns")
                .with_table(employee(ColumnDef::new("name", StorageType::Text))),
            SchemaVersion::new(2, "ns")
                .with_table(employee(ColumnDef::new("name", StorageType::Blob))),
            SchemaVersion::new(3, "ns")
                .with_table(employee(ColumnDef::new("name", StorageType::Blob).unique())),
        ];

        let err = ConstraintVerifier::new().verify(&schemas).unwrap_err();
        match err {
            MigrationError::ConstraintViolations(violations) => {
                let pairs: Vec<_> = violations
                    .iter()
                    .map(|v| (v.from_version, v.to_version))
                    .collect();
                assert_eq!(pairs, vec![(1, 2), (2, 3)]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_renamed_table_is_checked() {
        let mut staff = employee(ColumnDef::new("name", StorageType::Integer));
        staff.name = "Staff".into();
        let schemas = vec![
            SchemaVersion::new(1, "ns")
                .with_table(employee(ColumnDef::new("name", StorageType::Text))),
            SchemaVersion::new(2, "ns").with_table(staff),
        ];

        assert!(ConstraintVerifier::new().violations(&schemas).is_empty());

        let registry =
            RenameRegistry::new().with_mapping(RenameMapping::new(1, 2).with_rename("Employee", "Staff"));
        let violations = ConstraintVerifier::new()
            .with_renames(&registry)
            .violations(&schemas);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].table_name, "Staff");
    }

    #[test]
    fn test_storage_name_change_is_a_violation() {
        let schemas = vec![
            SchemaVersion::new(1, "ns")
                .with_table(employee(ColumnDef::new("name", StorageType::Text))),
            SchemaVersion::new(2, "ns").with_table(employee(
                ColumnDef::new("name", StorageType::Text).with_column_name("NAME"),
            )),
        ];

        assert_eq!(ConstraintVerifier::new().violations(&schemas).len(), 1);
    }
}
