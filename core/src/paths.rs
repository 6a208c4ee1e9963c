#![deny(missing_docs)]

//! # Path Generation
//!
//! Emits the JSON:API path items for every included entity:
//!
//! - `/<entity>`: list and create
//! - `/<entity>/{id}`: fetch, replace, update and delete
//! - `/<entity>/{id}/<field>`: the related resource(s)
//! - `/<entity>/{id}/relationships/<field>`: relationship linkage
//!
//! Operation ids follow `<verb>-<Entity>[-relationship-<field>][-put|-patch]`,
//! which keeps them unique across the document.

use crate::error::AppResult;
use crate::filters::filter_parameters;
use crate::model::{DataModel, Entity, Field};
use crate::options::{lower_case_first, GeneratorOptions};
use crate::policy::{PolicyAnalyzer, PolicyResult};
use crate::ref_utils::parameter_pointer;
use crate::type_mapping::schema_ref;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Media type of every request and response body.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// A single OpenAPI operation object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Document-unique id.
    pub operation_id: String,
    /// Human readable description.
    pub description: String,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Parameters (inline or `$ref`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Value>,
    /// Request body, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    /// Responses by status code.
    pub responses: IndexMap<String, Value>,
    /// `Some(vec![])` opens the operation; `None` inherits document security.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<Value>>,
}

impl Operation {
    fn new(operation_id: String, description: String, tag: &str) -> Self {
        Self {
            operation_id,
            description,
            tags: vec![tag.to_string()],
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
            security: None,
        }
    }

    fn parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = parameters;
        self
    }

    fn request(mut self, schema_name: &str) -> Self {
        self.request_body = Some(json!({
            "content": { JSONAPI_MEDIA_TYPE: { "schema": schema_ref(schema_name) } }
        }));
        self
    }

    fn respond(mut self, status: &str, response: Value) -> Self {
        self.responses.insert(status.to_string(), response);
        self
    }

    fn open_if(mut self, open: bool) -> Self {
        self.security = open.then(Vec::new);
        self
    }
}

/// Operations under one URL template, in `get, post, put, patch, delete` order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    /// `GET`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// `POST`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// `PUT`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// `PATCH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// `DELETE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Iterates the present operations.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        [&self.get, &self.post, &self.put, &self.patch, &self.delete]
            .into_iter()
            .flatten()
    }
}

fn success(schema_name: Option<&str>) -> Value {
    match schema_name {
        Some(name) => json!({
            "description": "Successful operation",
            "content": { JSONAPI_MEDIA_TYPE: { "schema": schema_ref(name) } }
        }),
        None => json!({ "description": "Successful operation" }),
    }
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { JSONAPI_MEDIA_TYPE: { "schema": schema_ref("_errorResponse") } }
    })
}

fn forbidden() -> Value {
    error_response("Request is forbidden")
}

fn not_found() -> Value {
    error_response("Resource is not found")
}

fn validation_error() -> Value {
    error_response("Request is unprocessable due to validation errors")
}

/// Open when a security override is declared, whatever its value, or the
/// analyzer proved unconditional access.
fn is_open(entity: &Entity, allowed: bool) -> bool {
    entity.has_security_override() || allowed
}

fn parameter(name: &str) -> Value {
    json!({ "$ref": parameter_pointer(name) })
}

/// Builds the path items of a model.
pub struct PathBuilder<'a> {
    model: &'a DataModel,
    options: &'a GeneratorOptions,
    policies: &'a dyn PolicyAnalyzer,
}

impl<'a> PathBuilder<'a> {
    /// Creates a builder.
    pub fn new(
        model: &'a DataModel,
        options: &'a GeneratorOptions,
        policies: &'a dyn PolicyAnalyzer,
    ) -> Self {
        Self {
            model,
            options,
            policies,
        }
    }

    /// Path items keyed by URL template, in entity then field declaration order.
    pub fn build(&self) -> AppResult<IndexMap<String, PathItem>> {
        let mut paths = IndexMap::new();
        for entity in self.model.included_entities() {
            tracing::debug!(entity = %entity.name, "building paths");
            self.entity_paths(entity, &mut paths)?;
        }
        Ok(paths)
    }

    fn collection_url(&self, entity: &Entity) -> String {
        format!(
            "{}/{}",
            self.options.normalized_prefix(),
            self.options.resource_segment(&entity.name)
        )
    }

    fn entity_paths(
        &self,
        entity: &Entity,
        paths: &mut IndexMap<String, PathItem>,
    ) -> AppResult<()> {
        let name = &entity.name;
        let tag = lower_case_first(name);
        let policy = self.policies.analyze(entity);
        let collection = self.collection_url(entity);
        let item = format!("{}/{{id}}", collection);

        let mut list_parameters = vec![
            parameter("include"),
            parameter("sort"),
            parameter("page-offset"),
            parameter("page-limit"),
        ];
        list_parameters.extend(
            filter_parameters(self.model, entity)?
                .iter()
                .map(|p| p.to_value()),
        );

        let collection_item = PathItem {
            get: Some(
                Operation::new(
                    format!("list-{}", name),
                    format!("List \"{}\" resources", name),
                    &tag,
                )
                .parameters(list_parameters)
                .respond("200", success(Some(&format!("{}ListResponse", name))))
                .respond("403", forbidden())
                .open_if(is_open(entity, policy.read)),
            ),
            post: Some(
                Operation::new(
                    format!("create-{}", name),
                    format!("Create a \"{}\" resource", name),
                    &tag,
                )
                .request(&format!("{}CreateRequest", name))
                .respond("201", success(Some(&format!("{}Response", name))))
                .respond("403", forbidden())
                .respond("422", validation_error())
                .open_if(is_open(entity, policy.create)),
            ),
            ..Default::default()
        };
        paths.insert(collection, collection_item);

        let update = |suffix: &str| {
            Operation::new(
                format!("update-{}-{}", name, suffix),
                format!("Update a \"{}\" resource", name),
                &tag,
            )
            .parameters(vec![parameter("id")])
            .request(&format!("{}UpdateRequest", name))
            .respond("200", success(Some(&format!("{}Response", name))))
            .respond("403", forbidden())
            .respond("404", not_found())
            .respond("422", validation_error())
            .open_if(is_open(entity, policy.update))
        };

        let single_item = PathItem {
            get: Some(
                Operation::new(
                    format!("fetch-{}", name),
                    format!("Fetch a \"{}\" resource", name),
                    &tag,
                )
                .parameters(vec![parameter("id"), parameter("include")])
                .respond("200", success(Some(&format!("{}Response", name))))
                .respond("403", forbidden())
                .respond("404", not_found())
                .open_if(is_open(entity, policy.read)),
            ),
            put: Some(update("put")),
            patch: Some(update("patch")),
            delete: Some(
                Operation::new(
                    format!("delete-{}", name),
                    format!("Delete a \"{}\" resource", name),
                    &tag,
                )
                .parameters(vec![parameter("id")])
                .respond("200", success(None))
                .respond("403", forbidden())
                .respond("404", not_found())
                .open_if(is_open(entity, policy.delete)),
            ),
            ..Default::default()
        };
        paths.insert(item.clone(), single_item);

        for field in entity.relationship_fields() {
            let Some(related) = self.model.related_entity(field)? else {
                continue;
            };
            if !related.is_included() {
                tracing::debug!(
                    entity = %name,
                    field = %field.name,
                    related = %related.name,
                    "skipping relationship to excluded entity"
                );
                continue;
            }
            self.relationship_paths(entity, field, related, &item, &tag, &policy, paths)?;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn relationship_paths(
        &self,
        entity: &Entity,
        field: &Field,
        related: &Entity,
        item: &str,
        tag: &str,
        policy: &PolicyResult,
        paths: &mut IndexMap<String, PathItem>,
    ) -> AppResult<()> {
        let name = &entity.name;
        let field_name = &field.name;
        let to_many = field.is_array();

        let mut related_parameters = vec![parameter("id"), parameter("include")];
        let mut relationship_parameters = vec![parameter("id")];
        if to_many {
            let mut paging = vec![
                parameter("sort"),
                parameter("page-offset"),
                parameter("page-limit"),
            ];
            paging.extend(
                filter_parameters(self.model, related)?
                    .iter()
                    .map(|p| p.to_value()),
            );
            related_parameters.extend(paging.iter().cloned());
            relationship_parameters.extend(paging);
        }

        let related_policy = self.policies.analyze(related);
        let related_response = if to_many {
            format!("{}ListResponse", related.name)
        } else {
            format!("{}Response", related.name)
        };

        let related_item = PathItem {
            get: Some(
                Operation::new(
                    format!("fetch-{}-related-{}", name, field_name),
                    format!("Fetch the related \"{}\" resource for \"{}\"", field_name, name),
                    tag,
                )
                .parameters(related_parameters)
                .respond("200", success(Some(&related_response)))
                .respond("403", forbidden())
                .respond("404", not_found())
                .open_if(is_open(entity, related_policy.read)),
            ),
            ..Default::default()
        };
        paths.insert(format!("{}/{}", item, field_name), related_item);

        let (request, response) = if to_many {
            ("_toManyRelationshipRequest", "_toManyRelationshipResponse")
        } else {
            ("_toOneRelationshipRequest", "_toOneRelationshipResponse")
        };
        let update = |suffix: &str| {
            Operation::new(
                format!("update-{}-relationship-{}-{}", name, field_name, suffix),
                format!("Update \"{}\" relationship for \"{}\"", field_name, name),
                tag,
            )
            .parameters(vec![parameter("id")])
            .request(request)
            .respond("200", success(Some(response)))
            .respond("403", forbidden())
            .respond("404", not_found())
            .respond("422", validation_error())
            .open_if(is_open(entity, policy.update))
        };

        let create = to_many.then(|| {
            Operation::new(
                format!("create-{}-relationship-{}", name, field_name),
                format!("Create new \"{}\" relationships for \"{}\"", field_name, name),
                tag,
            )
            .parameters(vec![parameter("id")])
            .request("_toManyRelationshipRequest")
            .respond("200", success(Some("_toManyRelationshipResponse")))
            .respond("403", forbidden())
            .respond("404", not_found())
            .respond("422", validation_error())
            .open_if(is_open(entity, policy.update))
        });

        let relationship_item = PathItem {
            get: Some(
                Operation::new(
                    format!("fetch-{}-relationship-{}", name, field_name),
                    format!("Fetch the \"{}\" relationships for \"{}\"", field_name, name),
                    tag,
                )
                .parameters(relationship_parameters)
                .respond("200", success(Some(response)))
                .respond("403", forbidden())
                .respond("404", not_found())
                .open_if(is_open(entity, policy.read)),
            ),
            post: create,
            put: Some(update("put")),
            patch: Some(update("patch")),
            delete: None,
        };
        paths.insert(
            format!("{}/relationships/{}", item, field_name),
            relationship_item,
        );

        Ok(())
    }
}

/// Renders path items into the `paths` object.
pub fn paths_value(paths: &IndexMap<String, PathItem>) -> AppResult<Map<String, Value>> {
    let mut map = Map::new();
    for (url, item) in paths {
        map.insert(url.clone(), serde_json::to_value(item)?);
    }
    Ok(map)
}
