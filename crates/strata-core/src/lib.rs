//! Strata Core - Schema catalog, diffing, and chained migration planning.
//!
//! This crate computes the structural changes between consecutive versions of
//! a SQLite schema and turns them into a validated chain of migrations.

pub mod catalog;
pub mod config;
pub mod error;
pub mod migration;

pub use catalog::{ColumnDef, IndexDef, SchemaVersion, StorageType, TableDef};
pub use config::GeneratorConfig;
pub use error::Error;
pub use migration::{
    ConstraintVerifier, ConstraintViolation, GeneratedMigrations, Generator, MigrationChain,
    MigrationError, MigrationNode, MigrationPlan, MigrationStep, MigrationTarget, PlanBuilder,
    RenameMapping, RenameRegistry, SchemaDiff,
};
