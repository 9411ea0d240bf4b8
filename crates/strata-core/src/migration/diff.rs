//! Schema diffing algorithm.
//!
//! Compares two schema versions and reports which tables were added, removed,
//! or renamed, and which columns and indexes changed on the tables both
//! versions share. Table identity is the logical name, rewritten through an
//! optional [`RenameMapping`]. Every result follows declaration order so plans
//! built from it are stable across runs.

use super::rename::RenameMapping;
use crate::catalog::{ColumnDef, IndexDef, SchemaVersion, TableDef};
use std::collections::HashSet;

/// A table matched across two schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePair<'a> {
    /// Definition in the source version.
    pub from: &'a TableDef,
    /// Definition in the target version.
    pub to: &'a TableDef,
}

impl TablePair<'_> {
    /// Check if the logical name changed between versions.
    pub fn is_rename(&self) -> bool {
        self.from.name != self.to.name
    }
}

fn forward<'m>(mapping: Option<&'m RenameMapping>, name: &'m str) -> &'m str {
    mapping.and_then(|m| m.changed_name(name)).unwrap_or(name)
}

fn backward<'m>(mapping: Option<&'m RenameMapping>, name: &'m str) -> &'m str {
    mapping.and_then(|m| m.original_name(name)).unwrap_or(name)
}

/// Tables in `to` with no counterpart in `from`.
pub fn added<'a>(
    from: &SchemaVersion,
    to: &'a SchemaVersion,
    mapping: Option<&RenameMapping>,
) -> Vec<&'a TableDef> {
    let known: HashSet<&str> = from
        .tables
        .iter()
        .map(|t| forward(mapping, &t.name))
        .collect();

    to.tables
        .iter()
        .filter(|t| !known.contains(t.name.as_str()))
        .collect()
}

/// Tables in `from` with no counterpart in `to`.
pub fn removed<'a>(
    from: &'a SchemaVersion,
    to: &SchemaVersion,
    mapping: Option<&RenameMapping>,
) -> Vec<&'a TableDef> {
    let kept: HashSet<&str> = to
        .tables
        .iter()
        .map(|t| backward(mapping, &t.name))
        .collect();

    from.tables
        .iter()
        .filter(|t| !kept.contains(t.name.as_str()))
        .collect()
}

/// Tables renamed by `mapping` whose new name exists in `to`.
pub fn renamed<'a>(
    from: &'a SchemaVersion,
    to: &'a SchemaVersion,
    mapping: Option<&RenameMapping>,
) -> Vec<TablePair<'a>> {
    let Some(mapping) = mapping else {
        return Vec::new();
    };

    from.tables
        .iter()
        .filter_map(|table| {
            let new_name = mapping.changed_name(&table.name)?;
            to.table(new_name).map(|to| TablePair { from: table, to })
        })
        .collect()
}

/// Tables present in both versions, renamed ones included.
pub fn common_tables<'a>(
    from: &'a SchemaVersion,
    to: &'a SchemaVersion,
    mapping: Option<&RenameMapping>,
) -> Vec<TablePair<'a>> {
    from.tables
        .iter()
        .filter_map(|table| {
            to.table(forward(mapping, &table.name))
                .map(|to| TablePair { from: table, to })
        })
        .collect()
}

/// Columns of `cur` whose name does not appear in `prev`.
pub fn added_columns<'a>(prev: &TableDef, cur: &'a TableDef) -> Vec<&'a ColumnDef> {
    cur.columns
        .iter()
        .filter(|c| prev.column(&c.name).is_none())
        .collect()
}

/// Columns of `prev` whose name does not appear in `cur`.
pub fn removed_columns<'a>(prev: &'a TableDef, cur: &TableDef) -> Vec<&'a ColumnDef> {
    prev.columns
        .iter()
        .filter(|c| cur.column(&c.name).is_none())
        .collect()
}

/// Columns present in both tables, paired in `prev` declaration order.
pub fn common_columns<'a>(
    prev: &'a TableDef,
    cur: &'a TableDef,
) -> Vec<(&'a ColumnDef, &'a ColumnDef)> {
    prev.columns
        .iter()
        .filter_map(|c| cur.column(&c.name).map(|other| (c, other)))
        .collect()
}

/// Indexes of `cur` whose name does not appear in `prev`.
pub fn added_indexes<'a>(prev: &TableDef, cur: &'a TableDef) -> Vec<&'a IndexDef> {
    cur.indexes
        .iter()
        .filter(|i| prev.index(&i.name).is_none())
        .collect()
}

/// Indexes of `prev` whose name does not appear in `cur`.
pub fn removed_indexes<'a>(prev: &'a TableDef, cur: &TableDef) -> Vec<&'a IndexDef> {
    prev.indexes
        .iter()
        .filter(|i| cur.index(&i.name).is_none())
        .collect()
}

/// Column and index changes on one common table.
#[derive(Debug, Clone)]
pub struct TableChanges<'a> {
    /// The matched table.
    pub pair: TablePair<'a>,
    /// Columns added in the target version.
    pub added_columns: Vec<&'a ColumnDef>,
    /// Columns missing from the target version.
    pub removed_columns: Vec<&'a ColumnDef>,
    /// Indexes added in the target version.
    pub added_indexes: Vec<&'a IndexDef>,
    /// Indexes missing from the target version.
    pub removed_indexes: Vec<&'a IndexDef>,
}

impl<'a> TableChanges<'a> {
    fn compute(pair: TablePair<'a>) -> Self {
        Self {
            added_columns: added_columns(pair.from, pair.to),
            removed_columns: removed_columns(pair.from, pair.to),
            added_indexes: added_indexes(pair.from, pair.to),
            removed_indexes: removed_indexes(pair.from, pair.to),
            pair,
        }
    }

    /// Check if the table's columns and indexes are unchanged.
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.added_indexes.is_empty()
            && self.removed_indexes.is_empty()
    }
}

/// Complete diff between two schema versions.
#[derive(Debug, Clone)]
pub struct SchemaDiff<'a> {
    /// Source schema version.
    pub from_version: u32,
    /// Target schema version.
    pub to_version: u32,
    /// Tables created in the target version.
    pub added_tables: Vec<&'a TableDef>,
    /// Tables renamed between the versions.
    pub renamed_tables: Vec<TablePair<'a>>,
    /// Tables dropped in the target version.
    pub removed_tables: Vec<&'a TableDef>,
    /// Per-table changes for every common table, unchanged ones included.
    pub table_changes: Vec<TableChanges<'a>>,
}

impl<'a> SchemaDiff<'a> {
    /// Compute the diff between two schema versions.
    pub fn compute(
        from: &'a SchemaVersion,
        to: &'a SchemaVersion,
        mapping: Option<&RenameMapping>,
    ) -> Self {
        SchemaDiff {
            from_version: from.version,
            to_version: to.version,
            added_tables: added(from, to, mapping),
            renamed_tables: renamed(from, to, mapping),
            removed_tables: removed(from, to, mapping),
            table_changes: common_tables(from, to, mapping)
                .into_iter()
                .map(TableChanges::compute)
                .collect(),
        }
    }

    /// Check if there are any changes.
    pub fn is_empty(&self) -> bool {
        self.added_tables.is_empty()
            && self.renamed_tables.is_empty()
            && self.removed_tables.is_empty()
            && self.table_changes.iter().all(TableChanges::is_empty)
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added_tables.len()
            + self.renamed_tables.len()
            + self.removed_tables.len()
            + self
                .table_changes
                .iter()
                .map(|c| {
                    c.added_columns.len()
                        + c.removed_columns.len()
                        + c.added_indexes.len()
                        + c.removed_indexes.len()
                })
                .sum::<usize>()
    }
}
