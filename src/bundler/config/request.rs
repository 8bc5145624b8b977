//! Job submission documents and their validation.

use super::{BuildConfig, BuildConfigBuilder, FeatureToggles, SigningCredential};
use crate::bundler::Platform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reasons a submission is rejected before any job is created.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required field is absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The platform list is empty.
    #[error("At least one platform must be selected")]
    NoPlatforms,

    /// A platform outside the supported set.
    #[error("{0}")]
    UnsupportedPlatform(String),

    /// The version is not a semantic version.
    #[error("app_version '{value}' is not a semantic version: {reason}")]
    InvalidVersion {
        /// Submitted value
        value: String,
        /// Parser message
        reason: String,
    },

    /// The build number is not a non-negative integer.
    #[error("build_number must be a non-negative integer, got {0}")]
    InvalidBuildNumber(String),

    /// A URL field does not parse or uses an unsupported scheme.
    #[error("{field} is not a valid http(s) URL: {reason}")]
    InvalidUrl {
        /// Field name
        field: &'static str,
        /// Parser message
        reason: String,
    },

    /// The package id has no usable characters.
    #[error("package_name '{0}' contains no valid identifier characters")]
    InvalidPackageId(String),

    /// A path field cannot be made absolute.
    #[error("{field} cannot be resolved to an absolute path: {reason}")]
    InvalidPath {
        /// Field name
        field: &'static str,
        /// Resolution failure
        reason: String,
    },

    /// The document is not well-formed or a field has the wrong type.
    #[error("Invalid build request: {0}")]
    Malformed(String),
}

/// Raw job submission, as received from a caller.
///
/// Required fields are optional here so that validation can name the missing
/// one; [`validate`](Self::validate) turns the request into a [`BuildConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildRequest {
    pub app_name: Option<String>,
    pub app_description: Option<String>,
    pub app_version: Option<String>,
    /// Accepts a number or a numeric string.
    pub build_number: Option<serde_json::Value>,
    pub package_name: Option<String>,
    pub web_url: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(flatten)]
    pub features: FeatureToggles,

    pub keystore_path: Option<PathBuf>,
    pub keystore_password: Option<String>,
    pub key_alias: Option<String>,
    pub key_password: Option<String>,

    pub icon_path: Option<PathBuf>,
    pub webhook_url: Option<String>,
}

impl BuildRequest {
    /// Parses a JSON submission.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::Malformed("Invalid JSON payload".into()));
        }
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// Validates the request and produces an immutable [`BuildConfig`].
    pub fn validate(self) -> Result<BuildConfig, ValidationError> {
        // Required-field order matches the submission contract.
        for (field, value) in [
            ("app_name", &self.app_name),
            ("app_description", &self.app_description),
            ("app_version", &self.app_version),
        ] {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(ValidationError::MissingField(field));
            }
        }
        let build_number = parse_build_number(self.build_number.as_ref())?;

        if self.platforms.is_empty() {
            return Err(ValidationError::NoPlatforms);
        }
        let platforms = self
            .platforms
            .iter()
            .map(|p| p.parse::<Platform>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(ValidationError::UnsupportedPlatform)?;

        let mut builder = BuildConfigBuilder::new()
            .app_name(self.app_name.unwrap_or_default())
            .description(self.app_description.unwrap_or_default())
            .version(self.app_version.unwrap_or_default())
            .build_number(build_number)
            .package_id(self.package_name.unwrap_or_default())
            .web_url(self.web_url.unwrap_or_default())
            .platforms(platforms)
            .features(self.features);

        if let Some(keystore_path) = self.keystore_path.filter(|p| !p.as_os_str().is_empty()) {
            builder = builder.signing(SigningCredential {
                keystore_path,
                store_password: self.keystore_password.unwrap_or_default(),
                key_alias: self.key_alias.unwrap_or_default(),
                key_password: self.key_password.unwrap_or_default(),
                info_path: None,
            });
        }
        if let Some(icon) = self.icon_path.filter(|p| !p.as_os_str().is_empty()) {
            builder = builder.icon_path(icon);
        }
        if let Some(webhook) = self.webhook_url {
            builder = builder.webhook_url(webhook);
        }

        builder.build()
    }
}

fn parse_build_number(value: Option<&serde_json::Value>) -> Result<u64, ValidationError> {
    match value {
        None | Some(serde_json::Value::Null) => Err(ValidationError::MissingField("build_number")),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| ValidationError::InvalidBuildNumber(n.to_string())),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            Err(ValidationError::MissingField("build_number"))
        }
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidBuildNumber(s.clone())),
        Some(other) => Err(ValidationError::InvalidBuildNumber(other.to_string())),
    }
}
