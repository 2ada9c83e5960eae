//! Transform options, as carried by a compiler plugin entry.

use anyhow::{Context, Result};
use serde::Deserialize;

/// How the generated functions obtain the factory namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleFormat {
    /// The namespace is imported once per file.
    #[default]
    EsModule,
    /// Each generated function requires the namespace in its own body.
    CommonJs,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TransformOptions {
    /// Module the tag is imported from.
    pub module_specifier: String,
    /// Module providing the node factories.
    pub factory_module: String,
    /// Name the generated code calls factories through, e.g. `ts`.
    pub factory_namespace: String,
    /// Parameter of the generated function, threaded into substitutions.
    pub parameter_name: String,
    pub module_format: ModuleFormat,
    /// Prepend `import ts from "typescript";` to ES modules that need it.
    pub insert_factory_import: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            module_specifier: "ts-transform-creator".to_string(),
            factory_module: "typescript".to_string(),
            factory_namespace: "ts".to_string(),
            parameter_name: "props".to_string(),
            module_format: ModuleFormat::EsModule,
            insert_factory_import: true,
        }
    }
}

impl TransformOptions {
    /// Reads options from a plugin entry's JSON object. Missing keys take
    /// their defaults; unknown keys are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: TransformOptions =
            serde_json::from_str(json).context("failed to parse transform options")?;
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("factoryNamespace", &self.factory_namespace),
            ("parameterName", &self.parameter_name),
        ] {
            if !is_identifier(value) {
                anyhow::bail!("`{key}` must be an identifier, got {value:?}");
            }
        }
        Ok(())
    }
}

pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = TransformOptions::from_json("{}").unwrap();
        assert_eq!(options, TransformOptions::default());
        assert_eq!(options.module_specifier, "ts-transform-creator");
        assert_eq!(options.factory_namespace, "ts");
    }

    #[test]
    fn test_camel_case_keys() {
        let options = TransformOptions::from_json(
            r#"{ "moduleFormat": "commonJs", "parameterName": "input", "insertFactoryImport": false }"#,
        )
        .unwrap();
        assert_eq!(options.module_format, ModuleFormat::CommonJs);
        assert_eq!(options.parameter_name, "input");
        assert!(!options.insert_factory_import);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_names() {
        let err = TransformOptions::from_json(r#"{ "factory": "ts" }"#).unwrap_err();
        assert!(err.to_string().contains("failed to parse transform options"));
        assert!(format!("{err:#}").contains("unknown field"));

        let err = TransformOptions::from_json(r#"{ "parameterName": "1x" }"#).unwrap_err();
        assert!(err.to_string().contains("parameterName"));
    }
}
