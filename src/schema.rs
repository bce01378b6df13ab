//! Structural conformance of metadata files.
//!
//! The schema document ships with the crate and is embedded at build time;
//! an alternative document can be loaded from disk.

use std::fs;
use std::path::Path;

use jsonschema::Draft;
use serde_json::Value;

use crate::diagnostics::{Diagnostic, Severity, S001};
use crate::errors::{Result, ValidatorError};

/// Schema document shipped alongside the validator.
const EMBEDDED_SCHEMA_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/addonVersion_schema.json"
));

/// A compiled schema document.
pub struct SchemaDocument {
    validator: jsonschema::Validator,
}

impl SchemaDocument {
    /// Compile the schema document embedded in the crate.
    pub fn embedded() -> Result<Self> {
        let schema: Value = serde_json::from_str(EMBEDDED_SCHEMA_JSON)?;
        Self::from_value(&schema)
    }

    /// Load and compile a schema document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let schema: Value = serde_json::from_str(&content)?;
        Self::from_value(&schema)
    }

    /// Compile a schema document that is already in memory.
    pub fn from_value(schema: &Value) -> Result<Self> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .map_err(|e| ValidatorError::format(format!("invalid schema document: {e}")))?;
        Ok(Self { validator })
    }

    /// Check `instance` against the schema, one diagnostic per violation.
    ///
    /// Each message names the instance path (`/` for the document root)
    /// followed by the reason reported by the schema engine.
    #[must_use]
    pub fn validate(&self, instance: &Value) -> Vec<Diagnostic> {
        self.validator
            .iter_errors(instance)
            .map(|err| {
                let path = err.instance_path().to_string();
                let path = if path.is_empty() { "/".to_string() } else { path };
                Diagnostic::new(Severity::Error, S001, format!("{path}: {err}"))
            })
            .collect()
    }

    /// Returns `true` if `instance` satisfies the schema.
    #[must_use]
    pub fn conforms(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }
}

/// Check `instance` against the embedded schema document.
pub fn validate_schema(instance: &Value) -> Result<Vec<Diagnostic>> {
    Ok(SchemaDocument::embedded()?.validate(instance))
}

/// Returns `true` if `instance` satisfies the embedded schema document.
pub fn conforms(instance: &Value) -> Result<bool> {
    Ok(SchemaDocument::embedded()?.conforms(instance))
}
