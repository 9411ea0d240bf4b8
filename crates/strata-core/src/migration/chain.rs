//! The linked chain of per-transition migrations.
//!
//! Each node wraps the plan for one transition and points at the node for the
//! transition before it. Applying the newest node to a database at any older
//! recorded version runs every outstanding plan in order. Nodes live in an
//! arena and the walk is a loop, so long histories never recurse.

use super::error::MigrationError;
use super::plan::{MigrationPlan, MigrationStep};
use tracing::{debug, info};

/// Something migration steps can be executed against, usually a live database.
pub trait MigrationTarget {
    /// Error reported by the target.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute one step.
    fn execute(&mut self, step: &MigrationStep) -> Result<(), Self::Error>;
}

/// One transition in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationNode {
    /// Version the database must be at before this plan runs.
    pub target_version: u32,
    /// Version the database is at after this plan runs.
    pub migrated_version: u32,
    /// The steps of this transition.
    pub plan: MigrationPlan,
    /// Index of the node for the preceding transition. `None` for the root.
    pub previous: Option<usize>,
}

impl MigrationNode {
    /// Check if this is the oldest transition.
    pub fn is_root(&self) -> bool {
        self.previous.is_none()
    }
}

/// Validated chain of migration nodes.
#[derive(Debug, Clone, Default)]
pub struct MigrationChain {
    nodes: Vec<MigrationNode>,
}

impl MigrationChain {
    /// Link plans for consecutive transitions, oldest first.
    pub fn new(plans: Vec<MigrationPlan>) -> Result<Self, MigrationError> {
        let nodes = plans
            .into_iter()
            .enumerate()
            .map(|(i, plan)| MigrationNode {
                target_version: plan.from_version,
                migrated_version: plan.to_version,
                previous: i.checked_sub(1),
                plan,
            })
            .collect();

        Self::from_nodes(nodes)
    }

    /// Validate explicitly linked nodes.
    ///
    /// Every node must move forward, point only at an earlier node, and start
    /// at the version its predecessor produces.
    pub fn from_nodes(nodes: Vec<MigrationNode>) -> Result<Self, MigrationError> {
        for (index, node) in nodes.iter().enumerate() {
            if node.target_version >= node.migrated_version {
                return Err(broken(format!(
                    "node {} migrates v{} to v{}",
                    index, node.target_version, node.migrated_version
                )));
            }

            let Some(previous) = node.previous else {
                continue;
            };
            if previous >= index {
                return Err(broken(format!(
                    "node {} links to node {}, which is not an earlier node",
                    index, previous
                )));
            }
            let prior = &nodes[previous];
            if prior.migrated_version != node.target_version {
                return Err(broken(format!(
                    "node {} starts at v{} but its predecessor produces v{}",
                    index, node.target_version, prior.migrated_version
                )));
            }
        }

        Ok(Self { nodes })
    }

    /// All nodes, oldest first.
    pub fn nodes(&self) -> &[MigrationNode] {
        &self.nodes
    }

    /// Get a node by index.
    pub fn node(&self, index: usize) -> Option<&MigrationNode> {
        self.nodes.get(index)
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the chain has no transitions.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the node producing `version`.
    pub fn find(&self, version: u32) -> Option<usize> {
        self.nodes.iter().position(|n| n.migrated_version == version)
    }

    /// Plans in chain order.
    pub fn plans(&self) -> impl Iterator<Item = &MigrationPlan> {
        self.nodes.iter().map(|n| &n.plan)
    }

    /// Apply the node at `index` to a database at `current_version`, running
    /// every earlier plan it still needs first.
    ///
    /// Returns the version the database ends at. The node's own plan always
    /// runs; callers skip the call when the database is already current.
    /// Run inside a transaction so a failed step leaves the database unchanged.
    pub fn apply<T: MigrationTarget>(
        &self,
        index: usize,
        target: &mut T,
        current_version: u32,
    ) -> Result<u32, MigrationError> {
        let mut path = vec![self.node_at(index)?];
        let mut node = path[0];

        while current_version < node.target_version {
            match node.previous {
                Some(previous) => {
                    node = self.node_at(previous)?;
                    path.push(node);
                }
                None => {
                    return Err(MigrationError::DatabaseTooOld {
                        current_version,
                        oldest_version: node.target_version,
                    });
                }
            }
        }

        info!(
            from_version = current_version,
            to_version = path[0].migrated_version,
            transitions = path.len(),
            "Applying migration chain"
        );

        let mut produced: Option<u32> = None;
        for node in path.into_iter().rev() {
            if let Some(actual) = produced {
                if actual != node.target_version {
                    return Err(MigrationError::UnexpectedVersion {
                        expected: node.target_version,
                        actual,
                    });
                }
            }

            execute_plan(&node.plan, target)?;
            debug!(
                name = %node.plan.name,
                from_version = node.target_version,
                to_version = node.migrated_version,
                steps = node.plan.step_count(),
                "Applied migration"
            );
            produced = Some(node.migrated_version);
        }

        let version = produced.unwrap_or(current_version);
        info!(version, "Migration chain applied");
        Ok(version)
    }

    /// Upgrade a database from `old_version` to `new_version`.
    pub fn upgrade<T: MigrationTarget>(
        &self,
        target: &mut T,
        old_version: u32,
        new_version: u32,
    ) -> Result<u32, MigrationError> {
        if old_version == new_version {
            debug!(version = old_version, "Database already current");
            return Ok(old_version);
        }
        if old_version > new_version {
            return Err(MigrationError::Downgrade {
                from_version: old_version,
                to_version: new_version,
            });
        }

        let index = self
            .find(new_version)
            .ok_or(MigrationError::NoMigrationForVersion {
                version: new_version,
            })?;
        self.apply(index, target, old_version)
    }

    fn node_at(&self, index: usize) -> Result<&MigrationNode, MigrationError> {
        self.nodes
            .get(index)
            .ok_or_else(|| broken(format!("no node at index {}", index)))
    }
}

/// Execute every step of `plan` against `target`, in order.
pub fn execute_plan<T: MigrationTarget>(
    plan: &MigrationPlan,
    target: &mut T,
) -> Result<(), MigrationError> {
    for (step_index, step) in plan.steps.iter().enumerate() {
        target
            .execute(step)
            .map_err(|e| MigrationError::StepFailed {
                from_version: plan.from_version,
                to_version: plan.to_version,
                step_index,
                message: e.to_string(),
            })?;
    }
    Ok(())
}

fn broken(message: String) -> MigrationError {
    MigrationError::BrokenChain { message }
}
