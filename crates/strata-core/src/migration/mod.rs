//! Migration planning for versioned SQLite schemas.
//!
//! This module turns an ordered history of schema versions into executable
//! migrations:
//! - Table rename mappings per version transition
//! - Rename-aware schema diffing
//! - Column definition drift checks across the whole history
//! - Deterministically ordered DDL plans per transition
//! - A linked migration chain that upgrades from any recorded version
//!
//! # Example
//!
//! ```
//! use strata_core::catalog::{ColumnDef, SchemaVersion, StorageType, TableDef};
//! use strata_core::migration::{Generator, RenameMapping};
//! use strata_core::GeneratorConfig;
//!
//! let employee = TableDef::new("Employee")
//!     .with_column(ColumnDef::id("id"))
//!     .with_column(ColumnDef::new("name", StorageType::Text));
//! let mut staff = employee.clone();
//! staff.name = "Staff".into();
//! staff.table_name = "Staff".into();
//!
//! let generated = Generator::new(GeneratorConfig::default())
//!     .with_schema(SchemaVersion::new(1, "com.example.db").with_table(employee))
//!     .with_schema(SchemaVersion::new(2, "com.example.db").with_table(staff))
//!     .with_renames(RenameMapping::new(1, 2).with_rename("Employee", "Staff"))
//!     .generate()?;
//!
//! let plan = generated.plan(1, 2).unwrap();
//! assert_eq!(plan.statements(), vec!["ALTER TABLE \"Employee\" RENAME TO \"Staff\""]);
//! # Ok::<(), strata_core::migration::MigrationError>(())
//! ```

pub mod chain;
pub mod diff;
pub mod error;
pub mod generator;
pub mod plan;
pub mod rename;
pub mod verify;

// Chain types
pub use chain::{execute_plan, MigrationChain, MigrationNode, MigrationTarget};

// Diff types
pub use diff::{SchemaDiff, TableChanges, TablePair};

// Error types
pub use error::MigrationError;

// Generator types
pub use generator::{GeneratedMigrations, Generator};

// Plan types
pub use plan::{MigrationPlan, MigrationStep, PlanBuilder};

// Rename types
pub use rename::{RenameMapping, RenameRegistry};

// Verifier types
pub use verify::{ConstraintVerifier, ConstraintViolation};
