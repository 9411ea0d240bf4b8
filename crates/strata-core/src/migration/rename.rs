//! Explicit table renames between schema versions.
//!
//! A [`RenameMapping`] tells the diff engine that a table disappearing under
//! one name and appearing under another is the same table, so the plan renames
//! it instead of dropping and recreating it.

use std::collections::BTreeMap;

/// Old-name to new-name table mapping for one version transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameMapping {
    from_version: u32,
    to_version: u32,
    names: BTreeMap<String, String>,
}

impl RenameMapping {
    /// Create an empty mapping bound to a version transition.
    pub fn new(from_version: u32, to_version: u32) -> Self {
        Self {
            from_version,
            to_version,
            names: BTreeMap::new(),
        }
    }

    /// Record that table `old` is called `new` in the target version.
    ///
    /// Mapping the same old name twice keeps the last entry.
    pub fn with_rename(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.names.insert(old.into(), new.into());
        self
    }

    /// Source schema version.
    pub fn from_version(&self) -> u32 {
        self.from_version
    }

    /// Target schema version.
    pub fn to_version(&self) -> u32 {
        self.to_version
    }

    /// Check if this mapping is bound to the given transition.
    pub fn applies_to(&self, from_version: u32, to_version: u32) -> bool {
        self.from_version == from_version && self.to_version == to_version
    }

    /// The new name of a renamed table.
    pub fn changed_name(&self, old: &str) -> Option<&str> {
        self.names.get(old).map(String::as_str)
    }

    /// The old name of a table that was renamed to `new`.
    pub fn original_name(&self, new: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, changed)| changed.as_str() == new)
            .map(|(old, _)| old.as_str())
    }

    /// Check if `new` is the result of a rename.
    pub fn is_renamed_target(&self, new: &str) -> bool {
        self.names.values().any(|changed| changed == new)
    }

    /// Iterate over `(old, new)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(o, n)| (o.as_str(), n.as_str()))
    }

    /// Number of renamed tables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the mapping renames nothing.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The set of rename mappings supplied alongside a schema sequence.
#[derive(Debug, Clone, Default)]
pub struct RenameRegistry {
    mappings: Vec<RenameMapping>,
}

impl RenameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping to the registry.
    pub fn with_mapping(mut self, mapping: RenameMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Add a mapping in place.
    pub fn register(&mut self, mapping: RenameMapping) {
        self.mappings.push(mapping);
    }

    /// Find the mapping for a transition. The first registered match wins.
    pub fn resolve(&self, from_version: u32, to_version: u32) -> Option<&RenameMapping> {
        self.mappings
            .iter()
            .find(|m| m.applies_to(from_version, to_version))
    }

    /// Iterate over every registered mapping.
    pub fn iter(&self) -> impl Iterator<Item = &RenameMapping> {
        self.mappings.iter()
    }

    /// Check if no mappings are registered.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl FromIterator<RenameMapping> for RenameRegistry {
    fn from_iter<I: IntoIterator<Item = RenameMapping>>(iter: I) -> Self {
        Self {
            mappings: iter.into_iter().collect(),
        }
    }
}
