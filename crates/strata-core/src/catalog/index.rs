//! Secondary index definitions.

use rkyv::{Archive, Deserialize, Serialize};

/// A secondary index on a table.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct IndexDef {
    /// Index name (unique within its table).
    pub name: String,
    /// Logical names of the indexed columns, in order.
    pub columns: Vec<String>,
}

impl IndexDef {
    /// Create a single-column index.
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![column.into()],
        }
    }

    /// Create an index over several columns.
    ///
    /// Migration planning only emits the first column; see
    /// [`PlanBuilder::strict_indexes`](crate::migration::PlanBuilder::strict_indexes).
    pub fn composite(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// The first indexed column, if any.
    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    /// Check if this index covers more than one column.
    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_column_index() {
        let index = IndexDef::new("IDX_EMPLOYEE_DESIGNATION", "designation");

        assert_eq!(index.first_column(), Some("designation"));
        assert!(!index.is_composite());
    }

    #[test]
    fn test_composite_index() {
        let index = IndexDef::composite("IDX_TEAM_CODE_NAME", ["teamCode", "name"]);

        assert_eq!(index.columns.len(), 2);
        assert_eq!(index.first_column(), Some("teamCode"));
        assert!(index.is_composite());
    }
}
