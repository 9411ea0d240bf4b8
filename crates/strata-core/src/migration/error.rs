//! Migration-specific error types.

use super::verify::ConstraintViolation;
use thiserror::Error;

/// Migration-specific errors.
///
/// Every variant is fatal: planning and applying never return partial results.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// No schema versions were registered.
    #[error("at least one schema version is required")]
    EmptySchemaSet,

    /// A schema version number below 1.
    #[error("invalid schema version {version}: versions start at 1")]
    InvalidVersion {
        /// The offending version.
        version: u32,
    },

    /// Two schemas share a version number.
    #[error("multiple schemas with version {version}")]
    DuplicateVersion {
        /// The duplicated version.
        version: u32,
    },

    /// A schema's namespace differs from the rest of the sequence.
    #[error("schema version {version} has namespace '{found}', expected '{expected}'")]
    NamespaceMismatch {
        /// The offending version.
        version: u32,
        /// Namespace of the first schema.
        expected: String,
        /// Namespace found on this schema.
        found: String,
    },

    /// A plan was requested for a non-increasing version pair.
    #[error("cannot plan a migration from version {from_version} to {to_version}")]
    InvalidTransition {
        /// Source schema version.
        from_version: u32,
        /// Target schema version.
        to_version: u32,
    },

    /// A rename mapping does not fit the schemas it is bound to.
    #[error("invalid rename mapping for v{from_version} -> v{to_version}: {message}")]
    InvalidRename {
        /// Source schema version.
        from_version: u32,
        /// Target schema version.
        to_version: u32,
        /// Description of the problem.
        message: String,
    },

    /// A schema version failed structural validation.
    #[error(transparent)]
    Schema(#[from] crate::error::Error),

    /// A multi-column index was planned while strict index mode is enabled.
    #[error("index '{index}' on table '{table}' spans {columns} columns; only single-column indexes can be migrated")]
    MultiColumnIndex {
        /// Owning table.
        table: String,
        /// Index name.
        index: String,
        /// Number of indexed columns.
        columns: usize,
    },

    /// Column definitions changed between consecutive schema versions.
    #[error("{} column definition(s) changed between schema versions:\n{}", .0.len(), format_violations(.0))]
    ConstraintViolations(Vec<ConstraintViolation>),

    /// The chain's nodes are not linked version to version.
    #[error("broken migration chain: {message}")]
    BrokenChain {
        /// Description of the broken link.
        message: String,
    },

    /// The database predates the oldest known migration.
    #[error("database version {current_version} is older than the oldest known migration (v{oldest_version})")]
    DatabaseTooOld {
        /// Version reported by the database.
        current_version: u32,
        /// Version the oldest migration starts from.
        oldest_version: u32,
    },

    /// A predecessor migration left the database at the wrong version.
    #[error("upgrade chain produced version {actual}, expected {expected}")]
    UnexpectedVersion {
        /// Version the next migration starts from.
        expected: u32,
        /// Version the previous migration produced.
        actual: u32,
    },

    /// No migration produces the requested version.
    #[error("no migration produces schema version {version}")]
    NoMigrationForVersion {
        /// The requested version.
        version: u32,
    },

    /// A downgrade was requested.
    #[error("cannot downgrade from version {from_version} to {to_version}")]
    Downgrade {
        /// Current database version.
        from_version: u32,
        /// Requested version.
        to_version: u32,
    },

    /// A migration step failed against the database.
    #[error("step {step_index} of migration v{from_version} -> v{to_version} failed: {message}")]
    StepFailed {
        /// Source schema version of the failing plan.
        from_version: u32,
        /// Target schema version of the failing plan.
        to_version: u32,
        /// Index of the failed step.
        step_index: usize,
        /// Error message.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

fn format_violations(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}
