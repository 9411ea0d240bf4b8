//! Schema catalog for strata.
//!
//! The catalog holds the in-memory model of one schema version: tables,
//! their columns, and their secondary indexes.

mod column;
mod index;
mod schema;
mod table;
mod types;

pub use column::ColumnDef;
pub use index::IndexDef;
pub use schema::SchemaVersion;
pub use table::TableDef;
pub use types::{quote_identifier, StorageType};
