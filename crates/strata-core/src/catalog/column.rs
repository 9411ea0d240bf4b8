//! Column definitions for tables.

use super::types::{quote_identifier, StorageType};
use rkyv::{Archive, Deserialize, Serialize};

/// A column definition within a table.
///
/// Two columns are equivalent when their rendered [`sql_definition`](Self::sql_definition)
/// strings are byte-equal.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Logical column name (the diff key).
    pub name: String,
    /// Column name in storage.
    pub column_name: String,
    /// Storage type tag.
    pub storage_type: StorageType,
    /// Constraint clause rendered after the type, e.g. `NOT NULL UNIQUE`.
    pub constraints: Option<String>,
    /// Whether this is the table's primary key column.
    pub primary_key: bool,
}

impl ColumnDef {
    /// Create a new column whose storage name equals its logical name.
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            name,
            storage_type,
            constraints: None,
            primary_key: false,
        }
    }

    /// Create an `INTEGER PRIMARY KEY AUTOINCREMENT` id column.
    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Integer)
            .primary_key()
            .constraint("AUTOINCREMENT")
    }

    /// Set the storage column name.
    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = column_name.into();
        self
    }

    /// Append a raw constraint clause.
    pub fn constraint(mut self, clause: impl AsRef<str>) -> Self {
        let clause = clause.as_ref().trim();
        if clause.is_empty() {
            return self;
        }
        self.constraints = Some(match self.constraints.take() {
            Some(existing) => format!("{} {}", existing, clause),
            None => clause.to_string(),
        });
        self
    }

    /// Mark as the primary key column.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.constraint("PRIMARY KEY")
    }

    /// Add a `NOT NULL` constraint.
    pub fn not_null(self) -> Self {
        self.constraint("NOT NULL")
    }

    /// Add a `UNIQUE` constraint.
    pub fn unique(self) -> Self {
        self.constraint("UNIQUE")
    }

    /// Render the column definition: `"name" TYPE constraints`.
    pub fn sql_definition(&self) -> String {
        match &self.constraints {
            Some(constraints) => format!(
                "{} {} {}",
                quote_identifier(&self.column_name),
                self.storage_type,
                constraints
            ),
            None => format!(
                "{} {}",
                quote_identifier(&self.column_name),
                self.storage_type
            ),
        }
    }

    /// Check if two columns render to the same definition.
    pub fn is_equivalent(&self, other: &ColumnDef) -> bool {
        self.sql_definition() == other.sql_definition()
    }
}
