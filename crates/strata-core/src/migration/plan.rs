//! Migration plan generation.
//!
//! Turns the diff of one version transition into an ordered list of DDL
//! steps. Order matters: later steps assume earlier ones already ran.
//!
//! 1. Added tables: create with the primary key, add the remaining columns,
//!    create the table's indexes.
//! 2. Renamed tables, including common tables whose storage name changed.
//! 3. Removed tables.
//! 4. Added columns on common tables.
//! 5. Added indexes on common tables.
//! 6. Removed indexes on common tables.
//!
//! Steps on common tables address the target storage name, since renames run
//! before them.

use super::diff::SchemaDiff;
use super::error::MigrationError;
use super::rename::RenameMapping;
use crate::catalog::{quote_identifier, IndexDef, SchemaVersion, TableDef};
use crate::config::GeneratorConfig;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// A single DDL operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MigrationStep {
    /// Create a table holding only its primary key column.
    CreateTable {
        /// Storage table name.
        table: String,
        /// Rendered primary key column definition.
        primary_key: String,
    },
    /// Add a column to an existing table.
    AddColumn {
        /// Storage table name.
        table: String,
        /// Storage column name.
        column: String,
        /// Rendered column definition.
        definition: String,
    },
    /// Rename a table.
    RenameTable {
        /// Old storage table name.
        from: String,
        /// New storage table name.
        to: String,
    },
    /// Drop a table if it exists.
    DropTable {
        /// Storage table name.
        table: String,
    },
    /// Create a single-column index if it does not exist.
    CreateIndex {
        /// Index name.
        name: String,
        /// Storage table name.
        table: String,
        /// Storage column name.
        column: String,
    },
    /// Drop an index if it exists.
    DropIndex {
        /// Index name.
        name: String,
    },
}

impl MigrationStep {
    /// Render the step as a SQLite statement.
    pub fn to_sql(&self) -> String {
        match self {
            MigrationStep::CreateTable { table, primary_key } => format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                quote_identifier(table),
                primary_key
            ),
            MigrationStep::AddColumn {
                table, definition, ..
            } => format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_identifier(table),
                definition
            ),
            MigrationStep::RenameTable { from, to } => format!(
                "ALTER TABLE {} RENAME TO {}",
                quote_identifier(from),
                quote_identifier(to)
            ),
            MigrationStep::DropTable { table } => {
                format!("DROP TABLE IF EXISTS {}", quote_identifier(table))
            }
            MigrationStep::CreateIndex {
                name,
                table,
                column,
            } => format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quote_identifier(name),
                quote_identifier(table),
                quote_identifier(column)
            ),
            MigrationStep::DropIndex { name } => {
                format!("DROP INDEX IF EXISTS {}", quote_identifier(name))
            }
        }
    }

    /// Get a description of this step.
    pub fn description(&self) -> String {
        match self {
            MigrationStep::CreateTable { table, .. } => format!("Create table '{}'", table),
            MigrationStep::AddColumn { table, column, .. } => {
                format!("Add column '{}' to '{}'", column, table)
            }
            MigrationStep::RenameTable { from, to } => {
                format!("Rename table '{}' to '{}'", from, to)
            }
            MigrationStep::DropTable { table } => format!("Drop table '{}'", table),
            MigrationStep::CreateIndex {
                name,
                table,
                column,
            } => format!("Create index '{}' on '{}.{}'", name, table, column),
            MigrationStep::DropIndex { name } => format!("Drop index '{}'", name),
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// The ordered steps of one version transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Source schema version (0 for a bootstrap plan).
    pub from_version: u32,
    /// Target schema version.
    pub to_version: u32,
    /// Generated migration name, e.g. `MigrateV1ToV2`.
    pub name: String,
    /// Ordered list of migration steps.
    pub steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    /// Build the plan between two schema versions with default options.
    pub fn build(
        from: &SchemaVersion,
        to: &SchemaVersion,
        mapping: Option<&RenameMapping>,
    ) -> Result<Self, MigrationError> {
        PlanBuilder::new().build(from, to, mapping)
    }

    /// Build the create-from-scratch plan for a schema with default options.
    pub fn bootstrap(schema: &SchemaVersion) -> Result<Self, MigrationError> {
        PlanBuilder::new().bootstrap(schema)
    }

    /// Rendered SQL statements in step order.
    pub fn statements(&self) -> Vec<String> {
        self.steps.iter().map(MigrationStep::to_sql).collect()
    }

    /// Hex BLAKE3 hash of the rendered statements joined by newlines.
    pub fn fingerprint(&self) -> String {
        let joined = self.statements().join("\n");
        hex::encode(blake3::hash(joined.as_bytes()).as_bytes())
    }

    /// Get the number of steps in the plan.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Check if this plan is empty (no steps).
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Builds [`MigrationPlan`]s.
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    config: GeneratorConfig,
}

impl PlanBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a generator configuration.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Reject multi-column indexes instead of planning their first column.
    pub fn strict_indexes(mut self, strict: bool) -> Self {
        self.config.strict_indexes = strict;
        self
    }

    /// Set the migration name prefix.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.migration_name_prefix = prefix.into();
        self
    }

    /// Build the plan for `from -> to`.
    pub fn build(
        &self,
        from: &SchemaVersion,
        to: &SchemaVersion,
        mapping: Option<&RenameMapping>,
    ) -> Result<MigrationPlan, MigrationError> {
        if from.version >= to.version {
            return Err(MigrationError::InvalidTransition {
                from_version: from.version,
                to_version: to.version,
            });
        }

        let diff = SchemaDiff::compute(from, to, mapping);
        self.log_diff(&diff);

        let mut steps = Vec::new();

        for table in &diff.added_tables {
            self.create_table_steps(to.version, table, &mut steps)?;
        }

        // Every common table whose storage name moved, mapped rename or not.
        for pair in diff.table_changes.iter().map(|c| c.pair) {
            if pair.from.table_name == pair.to.table_name {
                if pair.is_rename() {
                    debug!(
                        table = %pair.to.table_name,
                        "Renamed table keeps its storage name"
                    );
                }
                continue;
            }
            steps.push(MigrationStep::RenameTable {
                from: pair.from.table_name.clone(),
                to: pair.to.table_name.clone(),
            });
        }

        for table in &diff.removed_tables {
            steps.push(MigrationStep::DropTable {
                table: table.table_name.clone(),
            });
        }

        for changes in &diff.table_changes {
            for column in &changes.added_columns {
                steps.push(MigrationStep::AddColumn {
                    table: changes.pair.to.table_name.clone(),
                    column: column.column_name.clone(),
                    definition: column.sql_definition(),
                });
            }
        }

        for changes in &diff.table_changes {
            for index in &changes.added_indexes {
                steps.push(self.create_index_step(to.version, changes.pair.to, index)?);
            }
        }

        for changes in &diff.table_changes {
            for index in &changes.removed_indexes {
                steps.push(MigrationStep::DropIndex {
                    name: index.name.clone(),
                });
            }
        }

        if steps.is_empty() {
            warn!(
                from_version = from.version,
                to_version = to.version,
                "Migration plan has no steps"
            );
        }

        Ok(MigrationPlan {
            from_version: from.version,
            to_version: to.version,
            name: self.config.migration_name(from.version, to.version),
            steps,
        })
    }

    /// Build the plan that creates every table of `schema` on an empty database.
    pub fn bootstrap(&self, schema: &SchemaVersion) -> Result<MigrationPlan, MigrationError> {
        let mut steps = Vec::new();
        for table in &schema.tables {
            self.create_table_steps(schema.version, table, &mut steps)?;
        }

        info!(
            version = schema.version,
            tables = schema.tables.len(),
            steps = steps.len(),
            "Built bootstrap plan"
        );

        Ok(MigrationPlan {
            from_version: 0,
            to_version: schema.version,
            name: self.config.migration_name(0, schema.version),
            steps,
        })
    }

    fn create_table_steps(
        &self,
        version: u32,
        table: &TableDef,
        steps: &mut Vec<MigrationStep>,
    ) -> Result<(), MigrationError> {
        let primary_key = table.primary_key().ok_or_else(|| Error::InvalidSchema {
            version,
            message: format!("table '{}' has no primary key column", table.name),
        })?;

        steps.push(MigrationStep::CreateTable {
            table: table.table_name.clone(),
            primary_key: primary_key.sql_definition(),
        });

        for column in table.columns_without_primary_key() {
            steps.push(MigrationStep::AddColumn {
                table: table.table_name.clone(),
                column: column.column_name.clone(),
                definition: column.sql_definition(),
            });
        }

        for index in &table.indexes {
            steps.push(self.create_index_step(version, table, index)?);
        }

        Ok(())
    }

    fn create_index_step(
        &self,
        version: u32,
        table: &TableDef,
        index: &IndexDef,
    ) -> Result<MigrationStep, MigrationError> {
        let first = index.first_column().ok_or_else(|| Error::InvalidSchema {
            version,
            message: format!("index '{}' on table '{}' has no columns", index.name, table.name),
        })?;

        if index.is_composite() {
            if self.config.strict_indexes {
                return Err(MigrationError::MultiColumnIndex {
                    table: table.name.clone(),
                    index: index.name.clone(),
                    columns: index.columns.len(),
                });
            }
            warn!(
                table = %table.name,
                index = %index.name,
                columns = index.columns.len(),
                "Multi-column index planned on its first column only"
            );
        }

        let column = table
            .column(first)
            .map(|c| c.column_name.clone())
            .unwrap_or_else(|| first.to_string());

        Ok(MigrationStep::CreateIndex {
            name: index.name.clone(),
            table: table.table_name.clone(),
            column,
        })
    }

    fn log_diff(&self, diff: &SchemaDiff<'_>) {
        if !diff.added_tables.is_empty() {
            info!(
                from_version = diff.from_version,
                to_version = diff.to_version,
                count = diff.added_tables.len(),
                "Tables added"
            );
        }
        if !diff.renamed_tables.is_empty() {
            info!(
                from_version = diff.from_version,
                to_version = diff.to_version,
                count = diff.renamed_tables.len(),
                "Tables renamed"
            );
        }
        if !diff.removed_tables.is_empty() {
            info!(
                from_version = diff.from_version,
                to_version = diff.to_version,
                count = diff.removed_tables.len(),
                "Tables removed"
            );
        }
        for changes in diff.table_changes.iter().filter(|c| !c.is_empty()) {
            debug!(
                table = %changes.pair.to.name,
                added_columns = changes.added_columns.len(),
                added_indexes = changes.added_indexes.len(),
                removed_indexes = changes.removed_indexes.len(),
                "Table changed"
            );
        }
    }
}
