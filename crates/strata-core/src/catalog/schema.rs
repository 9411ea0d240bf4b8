//! Schema version - one versioned snapshot of the full table set.

use super::TableDef;
use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};
use std::collections::HashSet;

/// A versioned snapshot of every table, column, and index.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Schema version (>= 1, strictly increasing across a sequence).
    pub version: u32,
    /// Namespace label shared by every version of one schema.
    pub namespace: String,
    /// Table definitions in declaration order.
    pub tables: Vec<TableDef>,
}

impl SchemaVersion {
    /// Create an empty schema version.
    pub fn new(version: u32, namespace: impl Into<String>) -> Self {
        Self {
            version,
            namespace: namespace.into(),
            tables: Vec::new(),
        }
    }

    /// Add a table to the schema.
    pub fn with_table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    /// Get a table by logical name.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Check if a table with this logical name exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Logical table names in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Validate the version number and every table definition.
    pub fn validate(&self) -> Result<(), Error> {
        if self.version < 1 {
            return Err(self.invalid("schema versions start at 1"));
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(self.invalid(format!(
                    "table '{}' is declared more than once",
                    table.name
                )));
            }
            table.check().map_err(|message| self.invalid(message))?;
        }

        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::InvalidSchema {
            version: self.version,
            message: message.into(),
        }
    }

    /// Serialize the schema version to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a schema version from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
