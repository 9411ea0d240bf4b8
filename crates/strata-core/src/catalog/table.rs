//! Table definitions.

use super::column::ColumnDef;
use super::index::IndexDef;
use rkyv::{Archive, Deserialize, Serialize};
use std::collections::HashSet;

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct TableDef {
    /// Logical table name (unique within a schema version, the diff key).
    pub name: String,
    /// Table name in storage.
    pub table_name: String,
    /// Column definitions in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Secondary indexes in declaration order.
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    /// Create a new table whose storage name equals its logical name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table_name: name.clone(),
            name,
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Set the storage table name.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Add a column to the table.
    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Add multiple columns.
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Add an index to the table.
    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Get a column by logical name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get an index by name.
    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Get the primary key column.
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// All columns except the primary key, in declaration order.
    pub fn columns_without_primary_key(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    /// Logical column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Index names in declaration order.
    pub fn index_names(&self) -> Vec<&str> {
        self.indexes.iter().map(|i| i.name.as_str()).collect()
    }

    /// Check the table's structural invariants.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(format!(
                    "table '{}' declares column '{}' more than once",
                    self.name, column.name
                ));
            }
        }

        let pk_count = self.columns.iter().filter(|c| c.primary_key).count();
        if pk_count != 1 {
            return Err(format!(
                "table '{}' must have exactly one primary key column, found {}",
                self.name, pk_count
            ));
        }

        let mut seen = HashSet::new();
        for index in &self.indexes {
            if !seen.insert(index.name.as_str()) {
                return Err(format!(
                    "table '{}' declares index '{}' more than once",
                    self.name, index.name
                ));
            }
            if index.columns.is_empty() {
                return Err(format!(
                    "index '{}' on table '{}' has no columns",
                    index.name, self.name
                ));
            }
            if let Some(missing) = index.columns.iter().find(|c| self.column(c).is_none()) {
                return Err(format!(
                    "index '{}' on table '{}' references unknown column '{}'",
                    index.name, self.name, missing
                ));
            }
        }

        Ok(())
    }
}
