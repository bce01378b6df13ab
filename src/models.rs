use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;

/// Submission metadata describing one add-on release.
///
/// The download location is keyed `URL` in the metadata file while every
/// other key is lowercase; that casing is fixed by the schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(rename = "URL")]
    pub url: String,
    pub sha256: String,
    pub name: String,
    pub description: String,
    pub homepage: String,
}

impl MetadataRecord {
    /// Build a record from an already-loaded JSON document.
    ///
    /// Unknown keys are ignored; the schema check is responsible for them.
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}

/// Read a metadata file into a raw JSON document.
///
/// The raw form is what the schema check consumes; convert it with
/// [`MetadataRecord::from_value`] afterwards.
pub fn load_metadata(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
