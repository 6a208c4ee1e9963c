#![deny(missing_docs)]

//! # Generator Options
//!
//! The configuration object accepted by the generator. Deserializes from the
//! camelCase keys used by plugin configuration files.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// Default OpenAPI version emitted when none is configured.
pub const DEFAULT_SPEC_VERSION: &str = "3.0.0";

/// The only generation flavor this crate implements.
pub const REST_FLAVOR: &str = "rest";

/// How nullability is rendered for the target OpenAPI version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// OpenAPI 3.0: `nullable: true`.
    V3_0,
    /// OpenAPI 3.1: `oneOf` with a `null` type.
    V3_1,
}

impl SpecVersion {
    /// Maps an `openapi` version string to a rendering mode.
    pub fn parse(version: &str) -> AppResult<Self> {
        let mut parts = version.trim().split('.');
        match (parts.next(), parts.next()) {
            (Some("3"), Some("0")) => Ok(SpecVersion::V3_0),
            (Some("3"), Some("1")) => Ok(SpecVersion::V3_1),
            _ => Err(AppError::Configuration(format!(
                "Unsupported OpenAPI spec version '{}', expected 3.0.x or 3.1.x",
                version
            ))),
        }
    }
}

/// Options controlling a generation run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    /// Destination file. Required by the CLI, unused by the pure core.
    pub output: Option<PathBuf>,
    /// The `openapi` version string.
    pub spec_version: String,
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    pub description: Option<String>,
    /// API summary.
    pub summary: Option<String>,
    /// URL prefix for every path.
    pub prefix: String,
    /// Entity name to URL segment overrides.
    pub model_name_mapping: IndexMap<String, String>,
    /// Named security scheme definitions.
    pub security_schemes: Option<IndexMap<String, Value>>,
    /// Generation flavor. Only `rest` is supported.
    pub flavor: String,
    /// Only meaningful for the RPC flavor; rejected here.
    pub omit_input_details: Option<Value>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            output: None,
            spec_version: DEFAULT_SPEC_VERSION.to_string(),
            title: "JSON:API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            summary: None,
            prefix: String::new(),
            model_name_mapping: IndexMap::new(),
            security_schemes: None,
            flavor: REST_FLAVOR.to_string(),
            omit_input_details: None,
        }
    }
}

impl GeneratorOptions {
    /// Sets the output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Sets the `openapi` version string.
    pub fn with_spec_version(mut self, version: impl Into<String>) -> Self {
        self.spec_version = version.into();
        self
    }

    /// Sets the API title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the API version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the URL prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Overrides the URL segment of one entity.
    pub fn with_model_name(
        mut self,
        entity: impl Into<String>,
        segment: impl Into<String>,
    ) -> Self {
        self.model_name_mapping.insert(entity.into(), segment.into());
        self
    }

    /// Adds a named security scheme.
    pub fn with_security_scheme(mut self, name: impl Into<String>, scheme: Value) -> Self {
        self.security_schemes
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), scheme);
        self
    }

    /// Rejects options this flavor cannot honour.
    pub fn validate(&self) -> AppResult<SpecVersion> {
        if self.flavor != REST_FLAVOR {
            return Err(AppError::Configuration(format!(
                "Unsupported flavor '{}', only '{}' is available",
                self.flavor, REST_FLAVOR
            )));
        }
        if self.omit_input_details.is_some() {
            return Err(AppError::Configuration(
                "\"omitInputDetails\" option is not supported for the \"rest\" flavor".into(),
            ));
        }
        SpecVersion::parse(&self.spec_version)
    }

    /// The URL prefix with any trailing slash removed.
    pub fn normalized_prefix(&self) -> &str {
        self.prefix.trim_end_matches('/')
    }

    /// The URL segment naming an entity's collection.
    pub fn resource_segment(&self, entity: &str) -> String {
        let name = self
            .model_name_mapping
            .get(entity)
            .map(String::as_str)
            .unwrap_or(entity);
        lower_case_first(name)
    }
}

/// Lower-cases the first character (`BlogPost` -> `blogPost`).
pub fn lower_case_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
