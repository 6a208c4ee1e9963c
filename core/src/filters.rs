#![deny(missing_docs)]

//! # Filter Parameters
//!
//! Derives the `filter[...]` query parameters a collection endpoint accepts.
//! One pass per field, in declaration order, keyed on type and cardinality.

use crate::error::AppResult;
use crate::model::{DataModel, Entity, Field, FieldType, PrimitiveKind, Resolved};
use crate::type_mapping::{primitive_schema, schema_ref, wrap_array};
use serde_json::{json, Value};

/// A single query filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParameter {
    /// Parameter name, e.g. `filter[email$contains]`.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Schema of the accepted value.
    pub schema: Value,
}

impl FilterParameter {
    /// Renders the OpenAPI parameter object.
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "required": false,
            "description": self.description,
            "in": "query",
            "style": "form",
            "explode": false,
            "schema": self.schema,
        })
    }
}

const COLLECTION_OPERATORS: [(&str, &str, bool); 3] = [
    ("$has", "Collection contains filter", false),
    ("$hasEvery", "Collection contains-all filter", true),
    ("$hasSome", "Collection contains-any filter", true),
];

const RANGE_OPERATORS: [(&str, &str); 4] = [
    ("$lt", "Less-than filter"),
    ("$lte", "Less-than or equal filter"),
    ("$gt", "Greater-than filter"),
    ("$gte", "Greater-than or equal filter"),
];

const STRING_OPERATORS: [(&str, &str); 5] = [
    ("$contains", "String contains filter"),
    ("$icontains", "String case-insensitive contains filter"),
    ("$search", "String full-text search filter"),
    ("$startsWith", "String startsWith filter"),
    ("$endsWith", "String endsWith filter"),
];

/// Builds the ordered filter list for an entity.
pub fn filter_parameters(model: &DataModel, entity: &Entity) -> AppResult<Vec<FilterParameter>> {
    let single_id = entity.single_id().map(|f| f.name.as_str());
    let mut result = Vec::new();

    for field in &entity.fields {
        // filtered through the relationship instead
        if field.foreign_key {
            continue;
        }

        let value_schema = filter_value_schema(model, field)?;

        if single_id == Some(field.name.as_str()) {
            result.push(FilterParameter {
                name: "filter[id]".to_string(),
                description: "Id filter".to_string(),
                schema: value_schema,
            });
            continue;
        }

        result.push(make_filter(
            field,
            "",
            "Equality filter",
            wrap_array(value_schema.clone(), field.is_array()),
        ));

        // no nested relationship filters
        if field.is_relationship() {
            continue;
        }

        if field.is_array() {
            for (op, description, array) in COLLECTION_OPERATORS {
                let schema = wrap_array(value_schema.clone(), array);
                result.push(make_filter(field, op, description, schema));
            }
            result.push(make_filter(
                field,
                "$isEmpty",
                "Collection is empty filter",
                json!({ "type": "boolean" }),
            ));
            continue;
        }

        let Some(kind) = primitive_kind(field) else {
            continue;
        };
        if kind.is_ordered() {
            for (op, description) in RANGE_OPERATORS {
                result.push(make_filter(field, op, description, value_schema.clone()));
            }
        }
        if kind == PrimitiveKind::String {
            for (op, description) in STRING_OPERATORS {
                result.push(make_filter(field, op, description, value_schema.clone()));
            }
        }
    }

    Ok(result)
}

fn make_filter(field: &Field, operator: &str, description: &str, schema: Value) -> FilterParameter {
    FilterParameter {
        name: format!("filter[{}{}]", field.name, operator),
        description: format!("{} for \"{}\"", description, field.name),
        schema,
    }
}

fn primitive_kind(field: &Field) -> Option<PrimitiveKind> {
    match field.ty {
        FieldType::Primitive { kind } => Some(kind),
        _ => None,
    }
}

/// Enums keep their reference; entities and typedefs filter by a plain string.
fn filter_value_schema(model: &DataModel, field: &Field) -> AppResult<Value> {
    Ok(match model.resolve(&field.ty)? {
        Resolved::Primitive(kind) => primitive_schema(kind),
        Resolved::Enum(decl) => schema_ref(&decl.name),
        Resolved::Entity(_) | Resolved::TypeDef(_) => json!({ "type": "string" }),
    })
}
