//! Migration generation for a full schema history.
//!
//! The [`Generator`] validates a sequence of schema versions and their rename
//! mappings, runs the constraint verifier, and builds one plan per consecutive
//! pair, a bootstrap plan for empty databases, and the chain linking them.

use super::chain::{execute_plan, MigrationChain, MigrationTarget};
use super::error::MigrationError;
use super::plan::{MigrationPlan, MigrationStep, PlanBuilder};
use super::rename::{RenameMapping, RenameRegistry};
use super::verify::ConstraintVerifier;
use crate::catalog::SchemaVersion;
use crate::config::GeneratorConfig;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Builds migrations for a sequence of schema versions.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
    schemas: Vec<SchemaVersion>,
    renames: RenameRegistry,
}

impl Generator {
    /// Create a generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            schemas: Vec::new(),
            renames: RenameRegistry::new(),
        }
    }

    /// Register a schema version. Versions may be added in any order.
    pub fn with_schema(mut self, schema: SchemaVersion) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Register several schema versions.
    pub fn with_schemas(mut self, schemas: impl IntoIterator<Item = SchemaVersion>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    /// Register the table renames of one transition.
    pub fn with_renames(mut self, mapping: RenameMapping) -> Self {
        self.renames.register(mapping);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Validate the inputs and build every migration.
    pub fn generate(&self) -> Result<GeneratedMigrations, MigrationError> {
        let schemas = self.sorted_schemas()?;
        self.validate_renames(&schemas)?;

        if self.config.verify_constraints {
            ConstraintVerifier::new()
                .with_renames(&self.renames)
                .verify(&schemas)?;
        }

        let builder = PlanBuilder::from_config(&self.config);
        let plans = schemas
            .windows(2)
            .map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                builder.build(from, to, self.renames.resolve(from.version, to.version))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let latest = schemas.last().ok_or(MigrationError::EmptySchemaSet)?;
        let bootstrap = builder.bootstrap(latest)?;
        let chain = MigrationChain::new(plans)?;

        info!(
            namespace = %latest.namespace,
            current_version = latest.version,
            migrations = chain.len(),
            "Generated migrations"
        );

        Ok(GeneratedMigrations {
            namespace: latest.namespace.clone(),
            current_version: latest.version,
            bootstrap,
            chain,
        })
    }

    fn sorted_schemas(&self) -> Result<Vec<SchemaVersion>, MigrationError> {
        let mut schemas = self.schemas.clone();
        schemas.sort_by_key(|s| s.version);

        let Some(first) = schemas.first() else {
            return Err(MigrationError::EmptySchemaSet);
        };

        let mut seen = HashSet::new();
        for schema in &schemas {
            if schema.version < 1 {
                return Err(MigrationError::InvalidVersion {
                    version: schema.version,
                });
            }
            if !seen.insert(schema.version) {
                return Err(MigrationError::DuplicateVersion {
                    version: schema.version,
                });
            }
            if schema.namespace != first.namespace {
                return Err(MigrationError::NamespaceMismatch {
                    version: schema.version,
                    expected: first.namespace.clone(),
                    found: schema.namespace.clone(),
                });
            }
            schema.validate()?;
        }

        debug!(versions = schemas.len(), "Schema sequence validated");
        Ok(schemas)
    }

    fn validate_renames(&self, schemas: &[SchemaVersion]) -> Result<(), MigrationError> {
        for mapping in self.renames.iter() {
            let invalid = |message: String| MigrationError::InvalidRename {
                from_version: mapping.from_version(),
                to_version: mapping.to_version(),
                message,
            };

            let pair = schemas
                .windows(2)
                .find(|w| mapping.applies_to(w[0].version, w[1].version))
                .ok_or_else(|| {
                    invalid("versions are not consecutive in the schema sequence".to_string())
                })?;
            let (from, to) = (&pair[0], &pair[1]);

            let mut targets = HashSet::new();
            for (old, new) in mapping.iter() {
                if !targets.insert(new) {
                    return Err(invalid(format!(
                        "more than one table is renamed to '{}'",
                        new
                    )));
                }
                if !from.has_table(old) {
                    return Err(invalid(format!(
                        "table '{}' does not exist in version {}",
                        old, from.version
                    )));
                }
                if !to.has_table(new) {
                    return Err(invalid(format!(
                        "table '{}' does not exist in version {}",
                        new, to.version
                    )));
                }
                if from.has_table(new) {
                    return Err(invalid(format!(
                        "table '{}' already exists in version {}",
                        new, from.version
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Everything generated for one schema history.
#[derive(Debug, Clone)]
pub struct GeneratedMigrations {
    /// Namespace shared by every schema version.
    pub namespace: String,
    /// The newest schema version.
    pub current_version: u32,
    /// Plan creating the newest schema on an empty database.
    pub bootstrap: MigrationPlan,
    /// Per-transition plans, linked oldest to newest.
    pub chain: MigrationChain,
}

impl GeneratedMigrations {
    /// Find the plan for one transition.
    pub fn plan(&self, from_version: u32, to_version: u32) -> Option<&MigrationPlan> {
        self.chain
            .plans()
            .find(|p| p.from_version == from_version && p.to_version == to_version)
    }

    /// Bring a database at `old_version` to the current version.
    ///
    /// Version 0 means an empty database and runs the bootstrap plan.
    pub fn upgrade<T: MigrationTarget>(
        &self,
        target: &mut T,
        old_version: u32,
    ) -> Result<u32, MigrationError> {
        if old_version == 0 {
            info!(version = self.current_version, "Bootstrapping empty database");
            execute_plan(&self.bootstrap, target)?;
            return Ok(self.current_version);
        }
        self.chain.upgrade(target, old_version, self.current_version)
    }

    /// Serialize every plan to a JSON manifest.
    pub fn to_json(&self) -> Result<String, MigrationError> {
        let manifest = Manifest {
            namespace: &self.namespace,
            current_version: self.current_version,
            bootstrap: PlanEntry::from(&self.bootstrap),
            migrations: self.chain.plans().map(PlanEntry::from).collect(),
        };
        serde_json::to_string_pretty(&manifest)
            .map_err(|e| MigrationError::Serialization(e.to_string()))
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    namespace: &'a str,
    current_version: u32,
    bootstrap: PlanEntry<'a>,
    migrations: Vec<PlanEntry<'a>>,
}

#[derive(Serialize)]
struct PlanEntry<'a> {
    name: &'a str,
    from_version: u32,
    to_version: u32,
    fingerprint: String,
    statements: Vec<String>,
    steps: &'a [MigrationStep],
}

impl<'a> From<&'a MigrationPlan> for PlanEntry<'a> {
    fn from(plan: &'a MigrationPlan) -> Self {
        Self {
            name: &plan.name,
            from_version: plan.from_version,
            to_version: plan.to_version,
            fingerprint: plan.fingerprint(),
            statements: plan.statements(),
            steps: &plan.steps,
        }
    }
}
