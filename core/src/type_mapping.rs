#![deny(missing_docs)]

//! # Type Mapping
//!
//! Converts declared field types into OpenAPI schema fragments.
//! Handles primitives, model references, nullability and lists.
//!
//! Fragments are plain `serde_json::Value`s combined through the small set of
//! composition helpers below instead of ad hoc object merging.

use crate::error::AppResult;
use crate::model::{DataModel, Field, FieldType, PrimitiveKind, Resolved};
use crate::options::SpecVersion;
use crate::ref_utils::schema_pointer;
use serde_json::{json, Value};

/// A `$ref` to a schema component.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": schema_pointer(name) })
}

/// `allOf` composition of two fragments.
pub fn all_of(a: Value, b: Value) -> Value {
    json!({ "allOf": [a, b] })
}

/// `oneOf` composition of two fragments.
pub fn one_of(a: Value, b: Value) -> Value {
    json!({ "oneOf": [a, b] })
}

/// A list of `items`.
pub fn array_of(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Wraps as a list when `is_array` is set.
pub fn wrap_array(schema: Value, is_array: bool) -> Value {
    if is_array {
        array_of(schema)
    } else {
        schema
    }
}

/// Makes a fragment accept `null` in the dialect of the target version.
///
/// 3.0 ignores siblings of `$ref`, so references go through a single-entry `allOf`.
pub fn wrap_nullable(schema: Value, is_nullable: bool, version: SpecVersion) -> Value {
    if !is_nullable {
        return schema;
    }

    match version {
        SpecVersion::V3_1 => one_of(schema, json!({ "type": "null" })),
        SpecVersion::V3_0 => match schema {
            Value::Object(mut obj) if !obj.contains_key("$ref") => {
                obj.insert("nullable".to_string(), Value::Bool(true));
                Value::Object(obj)
            }
            other => json!({ "allOf": [other], "nullable": true }),
        },
    }
}

/// Base schema for a built-in scalar kind.
pub fn primitive_schema(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::String => json!({ "type": "string" }),
        PrimitiveKind::Int | PrimitiveKind::BigInt => json!({ "type": "integer" }),
        PrimitiveKind::Float => json!({ "type": "number" }),
        PrimitiveKind::Decimal => one_of(json!({ "type": "number" }), json!({ "type": "string" })),
        PrimitiveKind::Boolean => json!({ "type": "boolean" }),
        PrimitiveKind::DateTime => json!({ "type": "string", "format": "date-time" }),
        PrimitiveKind::Bytes => json!({
            "type": "string",
            "format": "byte",
            "description": "Base64 encoded byte array"
        }),
        PrimitiveKind::Json => json!({}),
    }
}

/// Trait for converting declared field types to OpenAPI schemas.
pub trait TypeMapper {
    /// Maps a type without any nullability or list wrapping.
    fn base_schema(&self, ty: &FieldType) -> AppResult<Value>;

    /// The OpenAPI version that decides nullable rendering.
    fn spec_version(&self) -> SpecVersion;

    /// Maps a field including nullability and list wrapping.
    fn field_schema(&self, field: &Field) -> AppResult<Value> {
        let base = self.base_schema(&field.ty)?;
        let nullable = wrap_nullable(base, field.optional, self.spec_version());
        Ok(wrap_array(nullable, field.is_array()))
    }
}

/// Maps field types against a loaded model graph.
#[derive(Debug, Clone, Copy)]
pub struct ModelTypeMapper<'a> {
    model: &'a DataModel,
    version: SpecVersion,
}

impl<'a> ModelTypeMapper<'a> {
    /// Creates a mapper for a model and target version.
    pub fn new(model: &'a DataModel, version: SpecVersion) -> Self {
        Self { model, version }
    }

    /// The model references are resolved against.
    pub fn model(&self) -> &'a DataModel {
        self.model
    }
}

impl TypeMapper for ModelTypeMapper<'_> {
    fn base_schema(&self, ty: &FieldType) -> AppResult<Value> {
        Ok(match self.model.resolve(ty)? {
            Resolved::Primitive(kind) => primitive_schema(kind),
            Resolved::Enum(decl) => schema_ref(&decl.name),
            Resolved::Entity(decl) => schema_ref(&decl.name),
            Resolved::TypeDef(decl) => schema_ref(&decl.name),
        })
    }

    fn spec_version(&self) -> SpecVersion {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::EnumDef;

    fn model_with_role() -> DataModel {
        DataModel {
            enums: vec![EnumDef {
                name: "Role".into(),
                members: vec!["USER".into(), "ADMIN".into()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_every_primitive_kind_is_mapped() {
        for kind in PrimitiveKind::ALL {
            let schema = primitive_schema(kind);
            assert!(schema.is_object(), "{:?} should map to an object", kind);
        }
        assert_eq!(primitive_schema(PrimitiveKind::BigInt)["type"], "integer");
        assert_eq!(primitive_schema(PrimitiveKind::DateTime)["format"], "date-time");
        assert_eq!(primitive_schema(PrimitiveKind::Bytes)["format"], "byte");
        assert_eq!(primitive_schema(PrimitiveKind::Json), json!({}));
        assert_eq!(
            primitive_schema(PrimitiveKind::Decimal)["oneOf"][1]["type"],
            "string"
        );
    }

    #[test]
    fn test_enum_reference() {
        let model = model_with_role();
        let mapper = ModelTypeMapper::new(&model, SpecVersion::V3_0);
        let schema = mapper
            .base_schema(&FieldType::Enum {
                name: "Role".into(),
            })
            .unwrap();
        assert_eq!(schema, json!({ "$ref": "#/components/schemas/Role" }));
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let model = DataModel::default();
        let mapper = ModelTypeMapper::new(&model, SpecVersion::V3_0);
        let res = mapper.base_schema(&FieldType::TypeDef {
            name: "Address".into(),
        });
        assert!(matches!(res, Err(AppError::Resolution(_))));
    }

    #[test]
    fn test_nullable_rendering_per_version() {
        let string = json!({ "type": "string" });
        assert_eq!(
            wrap_nullable(string.clone(), true, SpecVersion::V3_0),
            json!({ "type": "string", "nullable": true })
        );
        assert_eq!(
            wrap_nullable(string.clone(), true, SpecVersion::V3_1),
            json!({ "oneOf": [{ "type": "string" }, { "type": "null" }] })
        );
        assert_eq!(wrap_nullable(string.clone(), false, SpecVersion::V3_1), string);

        let reference = schema_ref("Role");
        assert_eq!(
            wrap_nullable(reference, true, SpecVersion::V3_0),
            json!({ "allOf": [{ "$ref": "#/components/schemas/Role" }], "nullable": true })
        );
    }

    #[test]
    fn test_optional_list_field() {
        let model = model_with_role();
        let mapper = ModelTypeMapper::new(&model, SpecVersion::V3_1);
        let field = Field::new("tags", FieldType::primitive(PrimitiveKind::String))
            .array()
            .optional();

        let schema = mapper.field_schema(&field).unwrap();
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["oneOf"][0]["type"], "string");
    }
}
