//! Immutable build configuration.

use super::{FeatureToggles, sanitize_identifier};
use crate::bundler::Platform;
use std::path::{Path, PathBuf};

/// Release signing identity for Android builds.
///
/// Either supplied by the caller or produced once per job by the credential
/// generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SigningCredential {
    /// Keystore file.
    pub keystore_path: PathBuf,
    /// Keystore password.
    #[serde(skip_serializing)]
    pub store_password: String,
    /// Key alias inside the keystore.
    pub key_alias: String,
    /// Key password.
    #[serde(skip_serializing)]
    pub key_password: String,
    /// Plaintext companion record, when one was written.
    pub info_path: Option<PathBuf>,
}

impl SigningCredential {
    /// True when the keystore file is present on disk.
    pub fn is_present(&self) -> bool {
        self.keystore_path.is_file()
    }
}

/// Validated configuration for one build job.
///
/// Constructed through [`BuildConfigBuilder`](super::BuildConfigBuilder) or
/// [`BuildRequest::validate`](super::BuildRequest::validate). The package
/// identifier is already sanitized.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub(super) app_name: String,
    pub(super) description: String,
    pub(super) version: semver::Version,
    pub(super) build_number: u64,
    pub(super) package_id: String,
    pub(super) web_url: url::Url,
    pub(super) platforms: Vec<Platform>,
    pub(super) features: FeatureToggles,
    pub(super) signing: Option<SigningCredential>,
    pub(super) icon_path: Option<PathBuf>,
    pub(super) webhook_url: Option<url::Url>,
}

impl BuildConfig {
    /// Display name of the app.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Store/pubspec description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Semantic version.
    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    /// Monotonic build number.
    pub fn build_number(&self) -> u64 {
        self.build_number
    }

    /// Sanitized package / bundle identifier.
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// URL loaded by the WebView.
    pub fn web_url(&self) -> &url::Url {
        &self.web_url
    }

    /// Requested platforms, deduplicated, in submission order.
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// WebView feature toggles.
    pub fn features(&self) -> &FeatureToggles {
        &self.features
    }

    /// Caller-supplied signing credential, if any.
    pub fn signing(&self) -> Option<&SigningCredential> {
        self.signing.as_ref()
    }

    /// Icon asset, if any.
    pub fn icon_path(&self) -> Option<&Path> {
        self.icon_path.as_deref()
    }

    /// Terminal-state notification endpoint, if any.
    pub fn webhook_url(&self) -> Option<&url::Url> {
        self.webhook_url.as_ref()
    }

    /// True when any Android-family platform is requested.
    pub fn wants_android(&self) -> bool {
        self.platforms.iter().any(Platform::is_android)
    }

    /// Caller-supplied credential whose keystore exists on disk.
    pub fn existing_credential(&self) -> Option<&SigningCredential> {
        self.signing.as_ref().filter(|c| c.is_present())
    }

    /// Filesystem-safe name derived from the app name.
    pub fn artifact_stem(&self) -> String {
        let stem = sanitize_identifier(&self.app_name);
        if stem.trim_matches('.').is_empty() {
            "app".to_string()
        } else {
            stem
        }
    }

    /// Pubspec `version:` value, `<semver>+<build>`.
    pub fn pubspec_version(&self) -> String {
        format!("{}+{}", self.version, self.build_number)
    }

    /// Organisation segment of the package id (`com.<org>.app`).
    pub fn organization(&self) -> &str {
        self.package_id
            .split('.')
            .nth(1)
            .filter(|s| !s.is_empty())
            .unwrap_or("example")
    }
}
