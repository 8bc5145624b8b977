//! The `project.json` document.

use crate::bundler::{FeatureToggles, ValidationError, sanitize_file_stem};
use serde::{Deserialize, Serialize};

/// Saved app configuration, without binary assets.
///
/// `build_number` keeps whatever JSON type the caller used so that a saved
/// document opens exactly as it was written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub app_name: String,
    #[serde(default)]
    pub app_description: String,
    pub app_version: String,
    pub build_number: serde_json::Value,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub web_url: String,

    #[serde(flatten)]
    pub features: FeatureToggles,

    // Credentials only; the keystore file travels as an asset.
    #[serde(default)]
    pub keystore_password: String,
    #[serde(default)]
    pub key_alias: String,
    #[serde(default)]
    pub key_password: String,
}

impl ProjectDocument {
    /// Extracts a document from a submission-shaped JSON object.
    ///
    /// Requires `app_name`, `app_version` and `build_number`; unknown fields
    /// such as platforms or asset paths are ignored.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let Some(object) = value.as_object() else {
            return Err(ValidationError::Malformed("Invalid JSON payload".into()));
        };
        for field in ["app_name", "app_version", "build_number"] {
            let present = match object.get(field) {
                None | Some(serde_json::Value::Null) => false,
                Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ValidationError::MissingField(field));
            }
        }
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// `<name>_v<version>_<build>.swab`, with the name reduced to
    /// `[A-Za-z0-9_-]`.
    pub fn file_name(&self) -> String {
        let build = match &self.build_number {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!(
            "{}_v{}_{}.{}",
            sanitize_file_stem(&self.app_name),
            version_segment(&self.app_version),
            version_segment(&build),
            super::EXTENSION
        )
    }
}

/// Like [`sanitize_file_stem`] but keeps dots.
fn version_segment(raw: &str) -> String {
    raw.split('.')
        .map(sanitize_file_stem)
        .collect::<Vec<_>>()
        .join(".")
}
