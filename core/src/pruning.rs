#![deny(missing_docs)]

//! # Component Pruning
//!
//! Removes every component that no path can reach. References are only
//! encoded as `$ref` strings, so the pass first builds an explicit reference
//! graph over component names and then runs plain reachability from the
//! components the paths mention.

use crate::components::Components;
use crate::ref_utils::{parse_component_ref, PARAMETERS, SCHEMAS};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// A component identified by section and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
    /// `schemas` or `parameters`.
    pub section: String,
    /// Component name.
    pub name: String,
}

impl ComponentKey {
    fn new(section: &str, name: &str) -> Self {
        Self {
            section: section.to_string(),
            name: name.to_string(),
        }
    }
}

/// Outgoing `$ref` edges of every component.
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    edges: IndexMap<ComponentKey, IndexSet<ComponentKey>>,
}

impl ReferenceGraph {
    /// Builds the graph from the current components.
    pub fn from_components(components: &Components) -> Self {
        let mut graph = Self::default();
        for (section, entries) in [
            (SCHEMAS, &components.schemas),
            (PARAMETERS, &components.parameters),
        ] {
            for (name, value) in entries {
                let mut refs = IndexSet::new();
                collect_refs(value, &mut refs);
                graph.edges.insert(ComponentKey::new(section, name), refs);
            }
        }
        graph
    }

    /// Components referenced directly by `key`.
    pub fn references(&self, key: &ComponentKey) -> impl Iterator<Item = &ComponentKey> {
        self.edges.get(key).into_iter().flatten()
    }

    /// Every component reachable from `roots`, roots included.
    pub fn reachable<'a>(
        &self,
        roots: impl IntoIterator<Item = &'a ComponentKey>,
    ) -> IndexSet<ComponentKey> {
        let mut seen = IndexSet::new();
        let mut queue: VecDeque<ComponentKey> = roots.into_iter().cloned().collect();

        while let Some(key) = queue.pop_front() {
            if !seen.insert(key.clone()) {
                continue;
            }
            queue.extend(self.references(&key).filter(|r| !seen.contains(*r)).cloned());
        }
        seen
    }
}

/// Collects every local component `$ref` inside a value.
pub fn collect_refs(value: &Value, out: &mut IndexSet<ComponentKey>) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(target)) = obj.get("$ref") {
                if let Some((section, name)) = parse_component_ref(target) {
                    out.insert(ComponentKey { section, name });
                }
            }
            for child in obj.values() {
                collect_refs(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        _ => {}
    }
}

/// Drops components unreachable from `paths`. Returns the removed keys.
pub fn prune_components(
    paths: &Map<String, Value>,
    components: &mut Components,
) -> Vec<ComponentKey> {
    let mut roots = IndexSet::new();
    for item in paths.values() {
        collect_refs(item, &mut roots);
    }

    let graph = ReferenceGraph::from_components(components);
    let keep = graph.reachable(&roots);

    let mut removed = Vec::new();
    for (section, entries) in [
        (SCHEMAS, &mut components.schemas),
        (PARAMETERS, &mut components.parameters),
    ] {
        entries.retain(|name, _| {
            let key = ComponentKey::new(section, name);
            let kept = keep.contains(&key);
            if !kept {
                tracing::debug!(section, component = %name, "pruning unreferenced component");
                removed.push(key);
            }
            kept
        });
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn components() -> Components {
        let mut components = Components::default();
        components.schemas.insert(
            "UserResponse".into(),
            json!({ "properties": { "data": { "$ref": "#/components/schemas/User" } } }),
        );
        components.schemas.insert(
            "User".into(),
            json!({ "properties": { "role": { "allOf": [{ "$ref": "#/components/schemas/Role" }] } } }),
        );
        components.schemas.insert("Role".into(), json!({ "type": "string" }));
        components.schemas.insert(
            "_toOneRelationship".into(),
            json!({ "properties": { "data": { "$ref": "#/components/schemas/_resourceIdentifier" } } }),
        );
        components.schemas.insert("_resourceIdentifier".into(), json!({ "type": "object" }));
        components.parameters.insert("id".into(), json!({ "name": "id" }));
        components.parameters.insert("sort".into(), json!({ "name": "sort" }));
        components
    }

    fn paths() -> Map<String, Value> {
        let value = json!({
            "/user/{id}": {
                "get": {
                    "parameters": [{ "$ref": "#/components/parameters/id" }],
                    "responses": {
                        "200": { "content": { "application/vnd.api+json": {
                            "schema": { "$ref": "#/components/schemas/UserResponse" }
                        } } }
                    }
                }
            }
        });
        value.as_object().cloned().unwrap()
    }

    fn schema_names(components: &Components) -> Vec<&str> {
        components.schemas.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_transitive_references_survive() {
        let mut components = components();
        let removed = prune_components(&paths(), &mut components);

        assert_eq!(schema_names(&components), vec!["UserResponse", "User", "Role"]);
        assert_eq!(components.parameters.keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(removed.len(), 3);
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let mut once = components();
        prune_components(&paths(), &mut once);

        let mut twice = once.clone();
        let removed = prune_components(&paths(), &mut twice);

        assert!(removed.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cycles_terminate() {
        let mut components = Components::default();
        components
            .schemas
            .insert("A".into(), json!({ "$ref": "#/components/schemas/B" }));
        components
            .schemas
            .insert("B".into(), json!({ "items": { "$ref": "#/components/schemas/A" } }));

        let graph = ReferenceGraph::from_components(&components);
        let root = ComponentKey::new(SCHEMAS, "A");
        let reachable = graph.reachable([&root]);
        assert_eq!(reachable.len(), 2);
    }

    #[test]
    fn test_empty_paths_remove_everything() {
        let mut components = components();
        prune_components(&Map::new(), &mut components);
        assert!(components.schemas.is_empty());
        assert!(components.parameters.is_empty());
    }
}
