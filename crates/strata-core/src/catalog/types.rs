//! Storage type tags for columns.

use rkyv::{Archive, Deserialize, Serialize};

/// Storage type of a column, using the SQLite type affinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
pub enum StorageType {
    /// Signed integer (also used for booleans, dates stored as epoch millis, and row ids).
    Integer,
    /// 8-byte IEEE floating point.
    Real,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
    /// Numeric affinity (decimals stored by value).
    Numeric,
}

impl StorageType {
    /// The SQL keyword used when rendering a column definition.
    pub fn as_sql(&self) -> &'static str {
        match self {
            StorageType::Integer => "INTEGER",
            StorageType::Real => "REAL",
            StorageType::Text => "TEXT",
            StorageType::Blob => "BLOB",
            StorageType::Numeric => "NUMERIC",
        }
    }
}

/// Quote an identifier for SQLite, doubling any embedded double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}
