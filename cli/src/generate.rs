#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads a model file and optional options file, runs the generator and writes
//! the document. Flags override values from the options file.

use crate::error::{CliError, CliResult};
use jsonapi_oas_core::{generate, read_model, read_options, write_document, GeneratorOptions};
use std::path::PathBuf;

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the model file (JSON, or YAML by extension).
    #[clap(long, env = "JSONAPI_OAS_MODEL")]
    pub model: PathBuf,

    /// Path to a generator options file (JSON, or YAML by extension).
    #[clap(long, env = "JSONAPI_OAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output path for the OpenAPI document.
    /// `.yaml`/`.yml` writes YAML, anything else pretty JSON.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// OpenAPI version to emit (3.0.x or 3.1.x).
    #[clap(long)]
    pub spec_version: Option<String>,

    /// API title.
    #[clap(long)]
    pub title: Option<String>,

    /// API version.
    #[clap(long = "api-version")]
    pub api_version: Option<String>,

    /// URL prefix for every path.
    #[clap(long)]
    pub prefix: Option<String>,
}

impl GenerateArgs {
    fn options(&self) -> CliResult<GeneratorOptions> {
        let mut options = match &self.config {
            Some(path) => read_options(path)?,
            None => GeneratorOptions::default(),
        };

        if let Some(output) = &self.output {
            options = options.with_output(output.clone());
        }
        if let Some(version) = &self.spec_version {
            options = options.with_spec_version(version.clone());
        }
        if let Some(title) = &self.title {
            options = options.with_title(title.clone());
        }
        if let Some(version) = &self.api_version {
            options = options.with_version(version.clone());
        }
        if let Some(prefix) = &self.prefix {
            options = options.with_prefix(prefix.clone());
        }
        Ok(options)
    }
}

/// Executes the generation.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let options = args.options()?;
    let output = options.output.clone().ok_or_else(|| {
        CliError::Arguments("an output path is required (--output or \"output\" option)".into())
    })?;

    let source = read_model(&args.model)?;
    let result = generate(&source.model, &options, &source.policies)?;

    tracing::info!(warnings = result.warnings.len(), "generation finished");

    write_document(&result.document, &output)?;
    println!("OpenAPI document written to {:?}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MODEL: &str = r#"{
        "entities": [
            {
                "name": "User",
                "fields": [
                    { "name": "id", "type": { "kind": "primitive", "type": "String" }, "id": true },
                    { "name": "email", "type": { "kind": "primitive", "type": "String" } }
                ]
            }
        ]
    }"#;

    fn args(dir: &std::path::Path) -> GenerateArgs {
        let model = dir.join("model.json");
        fs::write(&model, MODEL).unwrap();
        GenerateArgs {
            model,
            config: None,
            output: Some(dir.join("out/openapi.yaml")),
            spec_version: None,
            title: Some("Accounts".into()),
            api_version: None,
            prefix: None,
        }
    }

    #[test]
    fn test_execute_writes_yaml() {
        let dir = tempfile::tempdir().unwrap();
        execute(&args(dir.path())).unwrap();

        let written = fs::read_to_string(dir.path().join("out/openapi.yaml")).unwrap();
        let doc: serde_json::Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(doc["info"]["title"], "Accounts");
        assert!(doc["paths"].get("/user/{id}").is_some());
    }

    #[test]
    fn test_config_file_is_overridden_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("options.json");
        fs::write(
            &config,
            r#"{ "title": "From file", "version": "2.0.0", "prefix": "/api/", "output": "x.json" }"#,
        )
        .unwrap();

        let mut args = args(dir.path());
        args.config = Some(config);
        args.api_version = Some("3.1.4".into());
        let options = args.options().unwrap();

        assert_eq!(options.title, "Accounts");
        assert_eq!(options.version, "3.1.4");
        assert_eq!(options.output, Some(dir.path().join("out/openapi.yaml")));
        assert_eq!(options.normalized_prefix(), "/api");
    }

    #[test]
    fn test_missing_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        args.output = None;
        assert!(matches!(execute(&args), Err(CliError::Arguments(_))));
    }
}
