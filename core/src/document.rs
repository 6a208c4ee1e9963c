#![deny(missing_docs)]

//! # Document Assembly
//!
//! Orchestrates a generation run: validates options, builds components and
//! paths, prunes unreachable components, attaches security schemes and
//! renders the final OpenAPI document value.
//!
//! A run is a pure function of its inputs. Either a complete document is
//! returned or the first fatal error; non-fatal findings are collected as
//! warnings next to the document.

use crate::components::{build_components, Components};
use crate::error::AppResult;
use crate::model::DataModel;
use crate::options::{lower_case_first, GeneratorOptions};
use crate::paths::{paths_value, PathBuilder};
use crate::policy::PolicyAnalyzer;
use crate::pruning::prune_components;
use crate::security::{any_of_requirement, parse_security_schemes};
use crate::type_mapping::ModelTypeMapper;
use serde_json::{json, Map, Value};

/// The outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// The OpenAPI document.
    pub document: Value,
    /// Human readable, non-fatal findings.
    pub warnings: Vec<String>,
}

/// Generates the OpenAPI document for a model.
///
/// # Arguments
///
/// * `model` - The loaded model graph.
/// * `options` - Generator configuration.
/// * `policies` - Access policy analyzer deciding which operations are open.
pub fn generate(
    model: &DataModel,
    options: &GeneratorOptions,
    policies: &dyn PolicyAnalyzer,
) -> AppResult<GenerationResult> {
    let version = options.validate()?;
    let schemes = options
        .security_schemes
        .as_ref()
        .map(parse_security_schemes)
        .transpose()?;
    let warnings = mapping_warnings(model, options);

    let mapper = ModelTypeMapper::new(model, version);
    let mut components = build_components(&mapper)?;
    let paths = paths_value(&PathBuilder::new(model, options, policies).build()?)?;

    let removed = prune_components(&paths, &mut components);
    tracing::info!(
        paths = paths.len(),
        schemas = components.schemas.len(),
        pruned = removed.len(),
        "generated OpenAPI document"
    );

    let mut doc = Map::new();
    doc.insert("openapi".to_string(), json!(options.spec_version));
    doc.insert("info".to_string(), info_value(options));
    doc.insert("tags".to_string(), tags_value(model));
    doc.insert("paths".to_string(), Value::Object(paths));

    let mut components_obj = components_value(components);
    if let Some(schemes) = &schemes {
        let rendered: Map<String, Value> = schemes
            .iter()
            .map(|(name, scheme)| (name.clone(), scheme.to_value()))
            .collect();
        components_obj.insert("securitySchemes".to_string(), Value::Object(rendered));
    }
    doc.insert("components".to_string(), Value::Object(components_obj));

    if let Some(schemes) = schemes.as_ref().filter(|s| !s.is_empty()) {
        doc.insert("security".to_string(), any_of_requirement(schemes));
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    Ok(GenerationResult {
        document: Value::Object(doc),
        warnings,
    })
}

fn mapping_warnings(model: &DataModel, options: &GeneratorOptions) -> Vec<String> {
    options
        .model_name_mapping
        .keys()
        .filter(|name| model.entity(name).is_none())
        .map(|name| format!("Unable to find model \"{}\" for name mapping", name))
        .collect()
}

fn info_value(options: &GeneratorOptions) -> Value {
    let mut info = Map::new();
    info.insert("title".to_string(), json!(options.title));
    info.insert("version".to_string(), json!(options.version));
    if let Some(desc) = &options.description {
        info.insert("description".to_string(), json!(desc));
    }
    if let Some(summary) = &options.summary {
        info.insert("summary".to_string(), json!(summary));
    }
    Value::Object(info)
}

fn tags_value(model: &DataModel) -> Value {
    let tags = model
        .included_entities()
        .map(|entity| {
            let description = entity
                .meta
                .as_ref()
                .and_then(|m| m.tag_description.clone())
                .unwrap_or_else(|| format!("{} operations", entity.name));
            json!({
                "name": lower_case_first(&entity.name),
                "description": description,
            })
        })
        .collect();
    Value::Array(tags)
}

fn components_value(components: Components) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert(
        "schemas".to_string(),
        Value::Object(components.schemas.into_iter().collect()),
    );
    obj.insert(
        "parameters".to_string(),
        Value::Object(components.parameters.into_iter().collect()),
    );
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::{Entity, EnumDef, Field, FieldType, PrimitiveKind, ResourceMeta};
    use crate::policy::{PolicyResult, StaticPolicies};

    fn prim(kind: PrimitiveKind) -> FieldType {
        FieldType::primitive(kind)
    }

    fn user_only() -> DataModel {
        DataModel {
            entities: vec![Entity::new(
                "User",
                vec![
                    Field::new("id", prim(PrimitiveKind::String)).id(),
                    Field::new("email", prim(PrimitiveKind::String)),
                ],
            )],
            enums: vec![EnumDef {
                name: "Unused".into(),
                members: vec!["A".into()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_document() {
        let result = generate(
            &user_only(),
            &GeneratorOptions::default(),
            &StaticPolicies::new(),
        )
        .unwrap();
        let doc = &result.document;

        assert_eq!(doc["openapi"], "3.0.0");
        assert_eq!(doc["info"]["title"], "JSON:API");
        assert_eq!(doc["tags"], json!([{ "name": "user", "description": "User operations" }]));
        assert!(doc.get("security").is_none());
        assert!(result.warnings.is_empty());

        let schemas = doc["components"]["schemas"].as_object().unwrap();
        assert!(schemas.contains_key("User"));
        assert!(schemas.contains_key("_errorResponse"));
        assert!(!schemas.contains_key("Unused"));
        assert!(!schemas.contains_key("_toOneRelationship"));
        assert!(!schemas.contains_key("_toManyRelationshipRequest"));
    }

    #[test]
    fn test_security_schemes_and_open_reads() {
        let options = GeneratorOptions::default()
            .with_security_scheme("bearer", json!({ "type": "http", "scheme": "bearer" }));
        let policies = StaticPolicies::new().with(
            "User",
            PolicyResult {
                read: true,
                ..Default::default()
            },
        );
        let doc = generate(&user_only(), &options, &policies).unwrap().document;

        assert_eq!(doc["security"], json!([{ "bearer": [] }]));
        assert_eq!(
            doc["components"]["securitySchemes"]["bearer"],
            json!({ "type": "http", "scheme": "bearer" })
        );
        assert_eq!(doc["paths"]["/user"]["get"]["security"], json!([]));
        assert_eq!(doc["paths"]["/user/{id}"]["get"]["security"], json!([]));
        assert!(doc["paths"]["/user"]["post"].get("security").is_none());
    }

    #[test]
    fn test_invalid_scheme_aborts() {
        let options = GeneratorOptions::default()
            .with_security_scheme("weird", json!({ "type": "kerberos" }));
        let err = generate(&user_only(), &options, &StaticPolicies::new()).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_unresolved_reference_aborts() {
        let mut model = user_only();
        model.entities[0]
            .fields
            .push(Field::new("address", FieldType::TypeDef { name: "Address".into() }));
        let err =
            generate(&model, &GeneratorOptions::default(), &StaticPolicies::new()).unwrap_err();
        assert!(matches!(err, AppError::Resolution(_)));
    }

    #[test]
    fn test_unknown_mapping_is_a_warning() {
        let options = GeneratorOptions::default().with_model_name("Ghost", "ghosts");
        let result = generate(&user_only(), &options, &StaticPolicies::new()).unwrap();
        assert_eq!(
            result.warnings,
            vec!["Unable to find model \"Ghost\" for name mapping".to_string()]
        );
        assert!(result.document["paths"].get("/user").is_some());
    }

    #[test]
    fn test_tag_description_override() {
        let mut model = user_only();
        model.entities[0].meta = Some(ResourceMeta {
            tag_description: Some("Registered accounts".into()),
            ..Default::default()
        });
        let doc = generate(&model, &GeneratorOptions::default(), &StaticPolicies::new())
            .unwrap()
            .document;
        assert_eq!(doc["tags"][0]["description"], "Registered accounts");
    }
}
