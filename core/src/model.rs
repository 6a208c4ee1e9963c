#![deny(missing_docs)]

//! # Data Model
//!
//! The in-memory model graph the generator consumes: entities with ordered fields,
//! enums, and structured type definitions. The graph is produced by an upstream
//! loader; here it is read-only apart from deserialization.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Built-in scalar kinds a field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// Floating point number.
    Float,
    /// Arbitrary precision decimal.
    Decimal,
    /// Boolean flag.
    Boolean,
    /// Timestamp.
    DateTime,
    /// Raw bytes.
    Bytes,
    /// Free-form JSON value.
    Json,
}

impl PrimitiveKind {
    /// Every known kind, in declaration order.
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::String,
        PrimitiveKind::Int,
        PrimitiveKind::BigInt,
        PrimitiveKind::Float,
        PrimitiveKind::Decimal,
        PrimitiveKind::Boolean,
        PrimitiveKind::DateTime,
        PrimitiveKind::Bytes,
        PrimitiveKind::Json,
    ];

    /// Kinds supporting range comparison filters.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int
                | PrimitiveKind::BigInt
                | PrimitiveKind::Float
                | PrimitiveKind::Decimal
                | PrimitiveKind::DateTime
        )
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldType {
    /// A built-in scalar.
    Primitive {
        /// The scalar kind.
        #[serde(rename = "type")]
        kind: PrimitiveKind,
    },
    /// A reference to a declared enum.
    Enum {
        /// Enum name.
        name: String,
    },
    /// A reference to another entity (a relationship).
    Entity {
        /// Entity name.
        name: String,
    },
    /// A reference to a structured type definition.
    TypeDef {
        /// TypeDef name.
        name: String,
    },
}

impl FieldType {
    /// Shorthand for a primitive type.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        FieldType::Primitive { kind }
    }

    /// The referenced declaration name, if this is not a primitive.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            FieldType::Primitive { .. } => None,
            FieldType::Enum { name } | FieldType::Entity { name } | FieldType::TypeDef { name } => {
                Some(name)
            }
        }
    }
}

/// Whether a field holds one value or a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    /// A single value.
    #[default]
    Scalar,
    /// A list of values.
    Array,
}

/// A single field of an entity or type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field name as exposed in the API.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Scalar or list.
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Whether the field may be null.
    #[serde(default)]
    pub optional: bool,
    /// Whether the field is (part of) the identifier.
    #[serde(default)]
    pub id: bool,
    /// Whether the field stores the key side of a relationship.
    #[serde(default)]
    pub foreign_key: bool,
    /// Whether the field has a default value generator.
    #[serde(default)]
    pub has_default: bool,
}

impl Field {
    /// Creates a required scalar field.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            cardinality: Cardinality::Scalar,
            optional: false,
            id: false,
            foreign_key: false,
            has_default: false,
        }
    }

    /// Marks the field as a list.
    pub fn array(mut self) -> Self {
        self.cardinality = Cardinality::Array;
        self
    }

    /// Marks the field as nullable.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field as an identifier.
    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Marks the field as a foreign key.
    pub fn foreign_key(mut self) -> Self {
        self.foreign_key = true;
        self
    }

    /// Marks the field as having a default value.
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Whether the field is list-valued.
    pub fn is_array(&self) -> bool {
        self.cardinality == Cardinality::Array
    }

    /// Whether the field points to another entity.
    pub fn is_relationship(&self) -> bool {
        matches!(self.ty, FieldType::Entity { .. })
    }
}

/// Per-entity annotations controlling generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    /// Custom description for the entity's tag.
    #[serde(default)]
    pub tag_description: Option<String>,
    /// Security override. Its presence alone opens the entity's operations.
    #[serde(default)]
    pub security: Option<Value>,
    /// Omits the entity from generation.
    #[serde(default)]
    pub ignore: bool,
}

/// A modeled record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity name (e.g. `User`).
    pub name: String,
    /// Ordered fields.
    pub fields: Vec<Field>,
    /// Globally excluded from generation.
    #[serde(default)]
    pub excluded: bool,
    /// Optional resource metadata.
    #[serde(default)]
    pub meta: Option<ResourceMeta>,
}

impl Entity {
    /// Creates an entity with the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            excluded: false,
            meta: None,
        }
    }

    /// Attaches resource metadata.
    pub fn with_meta(mut self, meta: ResourceMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Whether paths and components are generated for this entity.
    pub fn is_included(&self) -> bool {
        !self.excluded && !self.meta.as_ref().is_some_and(|m| m.ignore)
    }

    /// Identifier fields in declaration order.
    pub fn id_fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.id).collect()
    }

    /// The identifier field, when the entity has exactly one.
    pub fn single_id(&self) -> Option<&Field> {
        match self.id_fields().as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Whether the identifier spans more than one field.
    pub fn has_compound_id(&self) -> bool {
        self.id_fields().len() > 1
    }

    /// Fields referencing other entities, in declaration order.
    pub fn relationship_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_relationship())
    }

    /// Whether a security override is declared.
    pub fn has_security_override(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.security.is_some())
    }
}

/// An enumerated type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    /// Enum name.
    pub name: String,
    /// Member names in declaration order.
    pub members: Vec<String>,
}

/// A structured scalar type. Never contributes relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    /// TypeDef name.
    pub name: String,
    /// Ordered fields.
    pub fields: Vec<Field>,
}

/// A field type resolved against the model.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    /// Built-in scalar.
    Primitive(PrimitiveKind),
    /// Declared enum.
    Enum(&'a EnumDef),
    /// Declared entity.
    Entity(&'a Entity),
    /// Declared type definition.
    TypeDef(&'a TypeDef),
}

/// The complete model graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    /// Entities in declaration order.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Enums in declaration order.
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    /// Type definitions in declaration order.
    #[serde(default)]
    pub type_defs: Vec<TypeDef>,
}

impl DataModel {
    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Entities that take part in generation.
    pub fn included_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_included())
    }

    /// Resolves a field type to its declaration.
    pub fn resolve(&self, ty: &FieldType) -> AppResult<Resolved<'_>> {
        let resolved = match ty {
            FieldType::Primitive { kind } => Some(Resolved::Primitive(*kind)),
            FieldType::Enum { name } => self
                .enums
                .iter()
                .find(|e| &e.name == name)
                .map(Resolved::Enum),
            FieldType::Entity { name } => self.entity(name).map(Resolved::Entity),
            FieldType::TypeDef { name } => self
                .type_defs
                .iter()
                .find(|t| &t.name == name)
                .map(Resolved::TypeDef),
        };

        resolved.ok_or_else(|| {
            AppError::Resolution(format!(
                "Type '{}' is not a declared enum, entity or typedef",
                ty.reference_name().unwrap_or_default()
            ))
        })
    }

    /// Resolves the entity targeted by a relationship field.
    pub fn related_entity(&self, field: &Field) -> AppResult<Option<&Entity>> {
        match self.resolve(&field.ty)? {
            Resolved::Entity(entity) => Ok(Some(entity)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> FieldType {
        FieldType::primitive(PrimitiveKind::String)
    }

    #[test]
    fn test_single_and_compound_ids() {
        let user = Entity::new(
            "User",
            vec![Field::new("id", string()).id(), Field::new("email", string())],
        );
        assert_eq!(user.single_id().map(|f| f.name.as_str()), Some("id"));
        assert!(!user.has_compound_id());

        let membership = Entity::new(
            "Membership",
            vec![
                Field::new("userId", string()).id(),
                Field::new("groupId", string()).id(),
            ],
        );
        assert!(membership.single_id().is_none());
        assert!(membership.has_compound_id());
    }

    #[test]
    fn test_inclusion_flags() {
        let mut entity = Entity::new("Audit", vec![]);
        assert!(entity.is_included());

        entity.excluded = true;
        assert!(!entity.is_included());

        let ignored = Entity::new("Audit", vec![]).with_meta(ResourceMeta {
            ignore: true,
            ..Default::default()
        });
        assert!(!ignored.is_included());
    }

    #[test]
    fn test_resolve_unknown_reference() {
        let model = DataModel::default();
        let err = model
            .resolve(&FieldType::Enum {
                name: "Role".into(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Resolution(msg) if msg.contains("Role")));
    }

    #[test]
    fn test_field_type_deserialization() {
        let raw = r#"{
            "name": "posts",
            "type": { "kind": "entity", "name": "Post" },
            "cardinality": "array"
        }"#;
        let field: Field = serde_json::from_str(raw).unwrap();
        assert!(field.is_relationship());
        assert!(field.is_array());
        assert!(!field.optional);

        let raw = r#"{ "name": "age", "type": { "kind": "primitive", "type": "Int" } }"#;
        let field: Field = serde_json::from_str(raw).unwrap();
        assert_eq!(field.ty, FieldType::primitive(PrimitiveKind::Int));
    }

    #[test]
    fn test_ordered_kinds() {
        let ordered: Vec<_> = PrimitiveKind::ALL
            .iter()
            .filter(|k| k.is_ordered())
            .collect();
        assert_eq!(ordered.len(), 5);
        assert!(!PrimitiveKind::String.is_ordered());
    }
}
