#![deny(missing_docs)]

//! # Component Schemas
//!
//! Builds the named schema and parameter components of the document:
//! the fixed JSON:API envelope building blocks (prefixed `_`), one schema per
//! enum and typedef, and the read/request/response family for each entity.
//!
//! Property insertion order always follows field declaration order so that
//! repeated runs serialize byte-identically.

use crate::error::AppResult;
use crate::model::{Entity, EnumDef, TypeDef};
use crate::options::SpecVersion;
use crate::type_mapping::{
    all_of, array_of, schema_ref, wrap_nullable, ModelTypeMapper, TypeMapper,
};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// Named components of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    /// `components.schemas`.
    pub schemas: IndexMap<String, Value>,
    /// `components.parameters`.
    pub parameters: IndexMap<String, Value>,
}

/// Which shape of an entity is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityMode {
    /// Returned resource object.
    Read,
    /// Payload of a create request.
    Create,
    /// Payload of an update request.
    Update,
}

/// Builds every component for the model. Pruning happens later.
pub fn build_components(mapper: &ModelTypeMapper<'_>) -> AppResult<Components> {
    let model = mapper.model();
    let mut components = Components {
        schemas: shared_schemas(mapper.spec_version()),
        parameters: shared_parameters(),
    };

    for decl in &model.enums {
        components.schemas.insert(decl.name.clone(), enum_schema(decl));
    }
    for decl in &model.type_defs {
        components
            .schemas
            .insert(decl.name.clone(), type_def_schema(decl, mapper)?);
    }
    for entity in &model.entities {
        tracing::debug!(entity = %entity.name, "building entity components");
        components.schemas.extend(entity_components(entity, mapper)?);
    }

    Ok(components)
}

/// The reusable query and path parameters.
pub fn shared_parameters() -> IndexMap<String, Value> {
    let mut params = IndexMap::new();
    params.insert(
        "id".to_string(),
        json!({
            "name": "id",
            "in": "path",
            "description": "The resource id",
            "required": true,
            "schema": { "type": "string" }
        }),
    );
    params.insert(
        "include".to_string(),
        query_parameter("include", "Relationships to include", "string"),
    );
    params.insert(
        "sort".to_string(),
        query_parameter("sort", "Fields to sort by", "string"),
    );
    params.insert(
        "page-offset".to_string(),
        query_parameter("page[offset]", "Offset for pagination", "integer"),
    );
    params.insert(
        "page-limit".to_string(),
        query_parameter("page[limit]", "Limit for pagination", "integer"),
    );
    params
}

fn query_parameter(name: &str, description: &str, ty: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "description": description,
        "required": false,
        "style": "form",
        "schema": { "type": ty }
    })
}

/// The fixed JSON:API envelope schemas.
pub fn shared_schemas(version: SpecVersion) -> IndexMap<String, Value> {
    let nullable = |schema: Value| wrap_nullable(schema, true, version);
    let identifier_list = array_of(schema_ref("_resourceIdentifier"));
    let mut schemas = IndexMap::new();

    schemas.insert(
        "_jsonapi".to_string(),
        json!({
            "type": "object",
            "description": "An object describing the server's implementation",
            "required": ["version"],
            "properties": {
                "version": { "type": "string" },
                "meta": schema_ref("_meta")
            }
        }),
    );
    schemas.insert(
        "_meta".to_string(),
        json!({
            "type": "object",
            "description": "Meta information about the request or response",
            "properties": {
                "serialization": { "description": "Serialization metadata" }
            },
            "additionalProperties": true
        }),
    );
    schemas.insert(
        "_resourceIdentifier".to_string(),
        json!({
            "type": "object",
            "description": "Identifier for a resource",
            "required": ["type", "id"],
            "properties": {
                "type": { "type": "string", "description": "Resource type" },
                "id": { "type": "string", "description": "Resource id" }
            }
        }),
    );
    schemas.insert(
        "_resource".to_string(),
        all_of(
            schema_ref("_resourceIdentifier"),
            json!({
                "type": "object",
                "description": "A resource with attributes and relationships",
                "properties": {
                    "attributes": { "type": "object", "description": "Resource attributes" },
                    "relationships": { "type": "object", "description": "Resource relationships" }
                }
            }),
        ),
    );
    schemas.insert(
        "_links".to_string(),
        json!({
            "type": "object",
            "required": ["self"],
            "description": "Links related to the resource",
            "properties": {
                "self": { "type": "string", "description": "Link for refetching the current results" }
            }
        }),
    );
    schemas.insert(
        "_pagination".to_string(),
        json!({
            "type": "object",
            "description": "Pagination information",
            "required": ["first", "last", "prev", "next"],
            "properties": {
                "first": nullable(json!({ "type": "string", "description": "Link to the first page" })),
                "last": nullable(json!({ "type": "string", "description": "Link to the last page" })),
                "prev": nullable(json!({ "type": "string", "description": "Link to the previous page" })),
                "next": nullable(json!({ "type": "string", "description": "Link to the next page" }))
            }
        }),
    );
    schemas.insert(
        "_errors".to_string(),
        json!({
            "type": "array",
            "description": "An array of error objects",
            "items": {
                "type": "object",
                "required": ["status", "code"],
                "properties": {
                    "status": { "type": "string", "description": "HTTP status" },
                    "code": { "type": "string", "description": "Error code" },
                    "providerCode": {
                        "type": "string",
                        "description": "Database provider error code if the error is thrown by the provider"
                    },
                    "title": { "type": "string", "description": "Error title" },
                    "detail": { "type": "string", "description": "Error detail" },
                    "reason": { "type": "string", "description": "Detailed error reason" },
                    "validationErrors": {
                        "type": "object",
                        "additionalProperties": true,
                        "description": "Field validation errors if the error is due to data validation failure"
                    }
                }
            }
        }),
    );
    schemas.insert(
        "_errorResponse".to_string(),
        json!({
            "type": "object",
            "required": ["errors"],
            "description": "An error response",
            "properties": {
                "jsonapi": schema_ref("_jsonapi"),
                "errors": schema_ref("_errors")
            }
        }),
    );
    schemas.insert(
        "_relationLinks".to_string(),
        json!({
            "type": "object",
            "required": ["self", "related"],
            "description": "Links related to a relationship",
            "properties": {
                "self": { "type": "string", "description": "Link for fetching this relationship" },
                "related": {
                    "type": "string",
                    "description": "Link for fetching the resource represented by this relationship"
                }
            }
        }),
    );
    schemas.insert(
        "_toOneRelationship".to_string(),
        json!({
            "type": "object",
            "description": "A to-one relationship",
            "properties": {
                "data": nullable(schema_ref("_resourceIdentifier"))
            }
        }),
    );
    schemas.insert(
        "_toOneRelationshipWithLinks".to_string(),
        json!({
            "type": "object",
            "required": ["links", "data"],
            "description": "A to-one relationship with links",
            "properties": {
                "links": schema_ref("_relationLinks"),
                "data": nullable(schema_ref("_resourceIdentifier"))
            }
        }),
    );
    schemas.insert(
        "_toManyRelationship".to_string(),
        json!({
            "type": "object",
            "required": ["data"],
            "description": "A to-many relationship",
            "properties": {
                "data": identifier_list.clone()
            }
        }),
    );
    schemas.insert(
        "_toManyRelationshipWithLinks".to_string(),
        json!({
            "type": "object",
            "required": ["links", "data"],
            "description": "A to-many relationship with links",
            "properties": {
                "links": schema_ref("_pagedRelationLinks"),
                "data": identifier_list.clone()
            }
        }),
    );
    schemas.insert(
        "_pagedRelationLinks".to_string(),
        with_description(
            all_of(schema_ref("_pagination"), schema_ref("_relationLinks")),
            "Relationship links with pagination information",
        ),
    );
    schemas.insert(
        "_toManyRelationshipRequest".to_string(),
        json!({
            "type": "object",
            "required": ["data"],
            "description": "Input for manipulating a to-many relationship",
            "properties": {
                "data": identifier_list
            }
        }),
    );
    schemas.insert(
        "_toOneRelationshipRequest".to_string(),
        with_description(
            nullable(json!({
                "type": "object",
                "required": ["data"],
                "properties": {
                    "data": schema_ref("_resourceIdentifier")
                }
            })),
            "Input for manipulating a to-one relationship",
        ),
    );
    schemas.insert(
        "_toManyRelationshipResponse".to_string(),
        with_description(
            all_of(schema_ref("_toManyRelationshipWithLinks"), jsonapi_overlay()),
            "Response for a to-many relationship",
        ),
    );
    schemas.insert(
        "_toOneRelationshipResponse".to_string(),
        with_description(
            all_of(schema_ref("_toOneRelationshipWithLinks"), jsonapi_overlay()),
            "Response for a to-one relationship",
        ),
    );

    schemas
}

fn jsonapi_overlay() -> Value {
    json!({
        "type": "object",
        "properties": { "jsonapi": schema_ref("_jsonapi") }
    })
}

/// Puts `description` first, ahead of the composed keys.
fn with_description(schema: Value, description: &str) -> Value {
    let mut obj = Map::new();
    obj.insert("description".to_string(), json!(description));
    if let Value::Object(rest) = schema {
        obj.extend(rest);
    }
    Value::Object(obj)
}

/// A string schema restricted to the enum's members.
pub fn enum_schema(decl: &EnumDef) -> Value {
    json!({
        "type": "string",
        "description": format!("The \"{}\" Enum", decl.name),
        "enum": decl.members,
    })
}

/// An object schema for a structured type definition.
pub fn type_def_schema(decl: &TypeDef, mapper: &impl TypeMapper) -> AppResult<Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &decl.fields {
        properties.insert(field.name.clone(), mapper.field_schema(field)?);
        if !field.optional {
            required.push(field.name.clone());
        }
    }

    let mut obj = Map::new();
    obj.insert("type".to_string(), json!("object"));
    obj.insert(
        "description".to_string(),
        json!(format!("The \"{}\" TypeDef", decl.name)),
    );
    obj.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        obj.insert("required".to_string(), json!(required));
    }
    Ok(Value::Object(obj))
}

/// The request, response and resource schemas of one entity.
pub fn entity_components(
    entity: &Entity,
    mapper: &impl TypeMapper,
) -> AppResult<IndexMap<String, Value>> {
    let name = &entity.name;
    let mut result = IndexMap::new();

    result.insert(
        format!("{}CreateRequest", name),
        json!({
            "type": "object",
            "description": format!("Input for creating a \"{}\"", name),
            "required": ["data"],
            "properties": {
                "data": entity_schema(entity, EntityMode::Create, mapper)?,
                "meta": schema_ref("_meta")
            }
        }),
    );
    result.insert(
        format!("{}UpdateRequest", name),
        json!({
            "type": "object",
            "description": format!("Input for updating a \"{}\"", name),
            "required": ["data"],
            "properties": {
                "data": entity_schema(entity, EntityMode::Update, mapper)?,
                "meta": schema_ref("_meta")
            }
        }),
    );

    let mut relationships = Map::new();
    for field in entity.relationship_fields() {
        let shape = if field.is_array() {
            "_toManyRelationship"
        } else {
            "_toOneRelationship"
        };
        relationships.insert(field.name.clone(), schema_ref(shape));
    }
    let resource = all_of(
        schema_ref(name),
        json!({
            "type": "object",
            "properties": {
                "relationships": { "type": "object", "properties": relationships }
            }
        }),
    );

    result.insert(
        format!("{}Response", name),
        json!({
            "type": "object",
            "description": format!("Response for a \"{}\"", name),
            "required": ["data"],
            "properties": {
                "jsonapi": schema_ref("_jsonapi"),
                "data": resource.clone(),
                "meta": schema_ref("_meta"),
                "included": array_of(schema_ref("_resource")),
                "links": schema_ref("_links")
            }
        }),
    );
    result.insert(
        format!("{}ListResponse", name),
        json!({
            "type": "object",
            "description": format!("Response for a list of \"{}\"", name),
            "required": ["data", "links"],
            "properties": {
                "jsonapi": schema_ref("_jsonapi"),
                "data": array_of(resource),
                "meta": schema_ref("_meta"),
                "included": array_of(schema_ref("_resource")),
                "links": all_of(schema_ref("_links"), schema_ref("_pagination"))
            }
        }),
    );
    result.insert(name.clone(), entity_schema(entity, EntityMode::Read, mapper)?);

    Ok(result)
}

/// Generates the resource object schema of an entity for the given mode.
pub fn entity_schema(
    entity: &Entity,
    mode: EntityMode,
    mapper: &impl TypeMapper,
) -> AppResult<Value> {
    let compound_id = entity.has_compound_id();
    let single_id = entity.single_id();

    let mut attributes = Map::new();
    let mut relationships = Map::new();
    let mut required: Vec<String> = Vec::new();

    // A compound id has no top-level `id`, so its parts stay regular attributes.
    for field in entity.fields.iter().filter(|f| compound_id || !f.id) {
        if field.foreign_key && mode != EntityMode::Read {
            continue;
        }

        if field.is_relationship() {
            let shape = match (mode, field.is_array()) {
                (EntityMode::Read, true) => "_toManyRelationshipWithLinks",
                (EntityMode::Read, false) => "_toOneRelationshipWithLinks",
                (_, true) => "_toManyRelationship",
                (_, false) => "_toOneRelationship",
            };
            relationships.insert(
                field.name.clone(),
                wrap_nullable(schema_ref(shape), field.optional, mapper.spec_version()),
            );
            continue;
        }

        attributes.insert(field.name.clone(), mapper.field_schema(field)?);
        let required_on_create = mode == EntityMode::Create
            && !field.optional
            && !field.has_default
            && !(field.is_relationship() && field.is_array());
        // no sparse fieldsets, so reads always carry every attribute
        if required_on_create || mode == EntityMode::Read {
            required.push(field.name.clone());
        }
    }

    let id_schema = match single_id {
        Some(field) => mapper.base_schema(&field.ty)?,
        None => json!({ "type": "string" }),
    };

    let mut attributes_obj = Map::new();
    attributes_obj.insert("type".to_string(), json!("object"));
    if !required.is_empty() {
        attributes_obj.insert("required".to_string(), json!(required));
    }
    attributes_obj.insert("properties".to_string(), Value::Object(attributes));

    let mut top_required = Vec::new();
    let id_required = match mode {
        EntityMode::Create => single_id.is_some_and(|f| !f.has_default),
        EntityMode::Read | EntityMode::Update => true,
    };
    if id_required {
        top_required.push("id");
    }
    top_required.extend(["type", "attributes"]);

    let mut properties = Map::new();
    properties.insert("id".to_string(), id_schema);
    properties.insert("type".to_string(), json!({ "type": "string" }));
    properties.insert("attributes".to_string(), Value::Object(attributes_obj));
    if !relationships.is_empty() {
        properties.insert(
            "relationships".to_string(),
            json!({ "type": "object", "properties": relationships }),
        );
    }

    Ok(json!({
        "type": "object",
        "description": format!("The \"{}\" model", entity.name),
        "required": top_required,
        "properties": properties,
    }))
}

/// Schema names generated for an entity.
pub fn entity_schema_names(entity: &Entity) -> [String; 5] {
    let name = &entity.name;
    [
        format!("{}CreateRequest", name),
        format!("{}UpdateRequest", name),
        format!("{}Response", name),
        format!("{}ListResponse", name),
        name.clone(),
    ]
}
