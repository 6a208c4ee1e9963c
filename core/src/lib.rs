#![deny(missing_docs)]

//! # JSON:API OpenAPI Core
//!
//! Turns a data-model definition (entities, fields, relationships, enums and
//! access policies) into a JSON:API flavoured OpenAPI document.

/// Shared error types.
pub mod error;

/// The input model graph.
pub mod model;

/// Access policy analysis seam.
pub mod policy;

/// Generator configuration.
pub mod options;

/// `$ref` construction and parsing.
pub mod ref_utils;

/// Type mapping logic (field type -> OpenAPI schema).
pub mod type_mapping;

/// Filter query parameters.
pub mod filters;

/// Component schema generation.
pub mod components;

/// Security scheme validation.
pub mod security;

/// Path and operation generation.
pub mod paths;

/// Unreachable component removal.
pub mod pruning;

/// Document assembly.
pub mod document;

/// Model/option loading and document writing.
pub mod files;

pub use components::{Components, EntityMode};
pub use document::{generate, GenerationResult};
pub use error::{AppError, AppResult};
pub use files::{read_model, read_options, render, write_document, ModelSource};
pub use model::{
    Cardinality, DataModel, Entity, EnumDef, Field, FieldType, PrimitiveKind, ResourceMeta,
    TypeDef,
};
pub use options::{GeneratorOptions, SpecVersion};
pub use policy::{PolicyAnalyzer, PolicyResult, StaticPolicies};
pub use type_mapping::{ModelTypeMapper, TypeMapper};
