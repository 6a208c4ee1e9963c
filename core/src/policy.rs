#![deny(missing_docs)]

//! # Access Policies
//!
//! The generator only needs to know whether an operation is unconditionally
//! allowed. Analysis itself lives outside this crate behind [`PolicyAnalyzer`].

use crate::model::Entity;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-entity verdicts. `true` means proven unconditionally allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResult {
    /// Read access.
    #[serde(default)]
    pub read: bool,
    /// Create access.
    #[serde(default)]
    pub create: bool,
    /// Update access.
    #[serde(default)]
    pub update: bool,
    /// Delete access.
    #[serde(default)]
    pub delete: bool,
}

impl PolicyResult {
    /// Everything unconditionally allowed.
    pub fn allow_all() -> Self {
        Self {
            read: true,
            create: true,
            update: true,
            delete: true,
        }
    }
}

/// Analyzes an entity's access policies.
pub trait PolicyAnalyzer {
    /// Returns which operations are unconditionally allowed.
    fn analyze(&self, entity: &Entity) -> PolicyResult;
}

impl<F> PolicyAnalyzer for F
where
    F: Fn(&Entity) -> PolicyResult,
{
    fn analyze(&self, entity: &Entity) -> PolicyResult {
        self(entity)
    }
}

/// A precomputed verdict table keyed by entity name.
///
/// Entities missing from the table get the all-`false` default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticPolicies(IndexMap<String, PolicyResult>);

impl StaticPolicies {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a verdict for an entity.
    pub fn with(mut self, entity: impl Into<String>, result: PolicyResult) -> Self {
        self.0.insert(entity.into(), result);
        self
    }
}

impl PolicyAnalyzer for StaticPolicies {
    fn analyze(&self, entity: &Entity) -> PolicyResult {
        self.0.get(&entity.name).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_table_defaults_to_denied() {
        let table = StaticPolicies::new().with(
            "Post",
            PolicyResult {
                read: true,
                ..Default::default()
            },
        );

        let post = Entity::new("Post", vec![]);
        let user = Entity::new("User", vec![]);
        assert!(table.analyze(&post).read);
        assert!(!table.analyze(&post).update);
        assert_eq!(table.analyze(&user), PolicyResult::default());
    }

    #[test]
    fn test_closure_analyzer() {
        let open = |_: &Entity| PolicyResult::allow_all();
        assert!(open.analyze(&Entity::new("Any", vec![])).delete);
    }

    #[test]
    fn test_table_deserialization() {
        let raw = r#"{ "Post": { "read": true }, "User": { "create": true } }"#;
        let table: StaticPolicies = serde_json::from_str(raw).unwrap();
        assert!(table.analyze(&Entity::new("Post", vec![])).read);
        assert!(table.analyze(&Entity::new("User", vec![])).create);
    }
}
