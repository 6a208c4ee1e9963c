#![deny(missing_docs)]

//! # File I/O
//!
//! Loading of model/option files and writing of the generated document.
//! YAML is chosen for `.yaml`/`.yml`, JSON for anything else.

use crate::error::{AppError, AppResult};
use crate::model::DataModel;
use crate::options::GeneratorOptions;
use crate::policy::StaticPolicies;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A model file: the model graph plus its precomputed policy verdicts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelSource {
    /// The model graph.
    #[serde(flatten)]
    pub model: DataModel,
    /// Policy verdicts keyed by entity name.
    #[serde(default)]
    pub policies: StaticPolicies,
}

/// Whether a path selects YAML output.
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn parse<T: DeserializeOwned>(content: &str, path: &Path) -> AppResult<T> {
    if is_yaml(path) {
        Ok(serde_yaml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Reads a model file.
pub fn read_model(path: &Path) -> AppResult<ModelSource> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::General(format!("Failed to read model file {:?}: {}", path, e))
    })?;
    parse(&content, path)
}

/// Reads a generator options file.
pub fn read_options(path: &Path) -> AppResult<GeneratorOptions> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::General(format!("Failed to read options file {:?}: {}", path, e))
    })?;
    parse(&content, path)
}

/// Serializes a document in the format selected by the destination.
pub fn render(document: &Value, path: &Path) -> AppResult<String> {
    if is_yaml(path) {
        Ok(serde_yaml::to_string(document)?)
    } else {
        Ok(serde_json::to_string_pretty(document)?)
    }
}

/// Writes a document, creating parent directories as needed.
pub fn write_document(document: &Value, path: &Path) -> AppResult<()> {
    let rendered = render(document, path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;
    tracing::debug!(path = %path.display(), "wrote OpenAPI document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extension_selects_format() {
        assert!(is_yaml(Path::new("out/openapi.yaml")));
        assert!(is_yaml(Path::new("openapi.yml")));
        assert!(!is_yaml(Path::new("openapi.json")));
        assert!(!is_yaml(Path::new("openapi")));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/openapi.json");
        let doc = json!({ "openapi": "3.0.0", "paths": {} });

        write_document(&doc, &path).unwrap();
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, doc);
    }

    #[test]
    fn test_yaml_rendering() {
        let doc = json!({ "openapi": "3.1.0" });
        let out = render(&doc, Path::new("api.yaml")).unwrap();
        let back: Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(back, doc);
        assert!(out.starts_with("openapi:"));
    }

    #[test]
    fn test_read_model_with_policies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        fs::write(
            &path,
            r#"
entities:
  - name: User
    fields:
      - name: id
        type: { kind: primitive, type: String }
        id: true
enums:
  - name: Role
    members: [USER, ADMIN]
policies:
  User: { read: true }
"#,
        )
        .unwrap();

        let source = read_model(&path).unwrap();
        assert_eq!(source.model.entities.len(), 1);
        assert_eq!(source.model.enums[0].members, vec!["USER", "ADMIN"]);
        assert!(source.model.entities[0].fields[0].id);
    }
}
