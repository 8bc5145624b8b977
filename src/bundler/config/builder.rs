//! Builder for constructing [`BuildConfig`].

use super::{BuildConfig, FeatureToggles, SigningCredential, ValidationError, sanitize_identifier};
use crate::bundler::Platform;
use std::path::{Path, PathBuf};

/// Builder for constructing [`BuildConfig`].
///
/// Provides a fluent API with validation on [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use swab::bundler::{BuildConfigBuilder, Platform};
///
/// let config = BuildConfigBuilder::new()
///     .app_name("My Shop")
///     .description("Storefront wrapper")
///     .version("1.2.0")
///     .build_number(7)
///     .package_id("com.my-shop.app")
///     .web_url("https://shop.example.com")
///     .platforms([Platform::Android, Platform::Web])
///     .build()
///     .unwrap();
///
/// assert_eq!(config.package_id(), "com.myshop.app");
/// assert_eq!(config.pubspec_version(), "1.2.0+7");
/// ```
#[derive(Default)]
pub struct BuildConfigBuilder {
    app_name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    build_number: Option<u64>,
    package_id: Option<String>,
    web_url: Option<String>,
    platforms: Vec<Platform>,
    features: FeatureToggles,
    signing: Option<SigningCredential>,
    icon_path: Option<PathBuf>,
    webhook_url: Option<String>,
}

impl BuildConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the display name. Required.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Sets the description. Required.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the semantic version. Required.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the build number. Required.
    pub fn build_number(mut self, build_number: u64) -> Self {
        self.build_number = Some(build_number);
        self
    }

    /// Sets the package / bundle identifier. Required; sanitized on build.
    pub fn package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    /// Sets the WebView URL. Required.
    pub fn web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = Some(url.into());
        self
    }

    /// Sets the target platforms. Required, non-empty.
    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    /// Sets the feature toggles.
    ///
    /// Default: [`FeatureToggles::default`]
    pub fn features(mut self, features: FeatureToggles) -> Self {
        self.features = features;
        self
    }

    /// Sets a caller-supplied signing credential.
    pub fn signing(mut self, credential: SigningCredential) -> Self {
        self.signing = Some(credential);
        self
    }

    /// Sets the icon asset path.
    pub fn icon_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the webhook URL.
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a required field is missing or
    /// empty, the version is not semver, a URL does not parse, the platform
    /// list is empty, or the package id sanitizes to nothing. Relative
    /// keystore and icon paths are resolved against the current working
    /// directory.
    pub fn build(self) -> Result<BuildConfig, ValidationError> {
        let app_name = required("app_name", self.app_name)?;
        let description = required("app_description", self.description)?;
        let version_raw = required("app_version", self.version)?;
        let build_number = self
            .build_number
            .ok_or(ValidationError::MissingField("build_number"))?;
        let package_raw = required("package_name", self.package_id)?;
        let web_url_raw = required("web_url", self.web_url)?;

        let version = semver::Version::parse(version_raw.trim()).map_err(|e| {
            ValidationError::InvalidVersion {
                value: version_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let package_id = sanitize_identifier(&package_raw);
        if package_id.trim_matches('.').is_empty() {
            return Err(ValidationError::InvalidPackageId(package_raw));
        }

        let web_url = parse_http_url("web_url", &web_url_raw)?;
        let webhook_url = self
            .webhook_url
            .filter(|u| !u.trim().is_empty())
            .map(|u| parse_http_url("webhook_url", &u))
            .transpose()?;

        let mut platforms = Vec::with_capacity(self.platforms.len());
        for platform in self.platforms {
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
        if platforms.is_empty() {
            return Err(ValidationError::NoPlatforms);
        }

        let signing = self
            .signing
            .map(|mut credential| {
                credential.keystore_path = absolute("keystore_path", &credential.keystore_path)?;
                Ok::<_, ValidationError>(credential)
            })
            .transpose()?;
        let icon_path = self
            .icon_path
            .map(|p| absolute("icon_path", &p))
            .transpose()?;

        Ok(BuildConfig {
            app_name,
            description,
            version,
            build_number,
            package_id,
            web_url,
            platforms,
            features: self.features,
            signing,
            icon_path,
            webhook_url,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn absolute(field: &'static str, path: &Path) -> Result<PathBuf, ValidationError> {
    std::path::absolute(path).map_err(|e| ValidationError::InvalidPath {
        field,
        reason: e.to_string(),
    })
}

fn parse_http_url(field: &'static str, raw: &str) -> Result<url::Url, ValidationError> {
    let url = url::Url::parse(raw.trim()).map_err(|e| ValidationError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::InvalidUrl {
            field,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BuildConfigBuilder {
        BuildConfigBuilder::new()
            .app_name("Demo")
            .description("Demo app")
            .version("1.0.0")
            .build_number(1)
            .package_id("com.example.demo")
            .web_url("https://example.com")
            .platforms([Platform::Web])
    }

    #[test]
    fn builds_with_defaults() {
        let config = base().build().unwrap();
        assert_eq!(config.platforms(), &[Platform::Web]);
        assert!(config.features().enable_javascript);
        assert!(config.signing().is_none());
        assert_eq!(config.organization(), "example");
    }

    #[test]
    fn rejects_empty_platforms() {
        let err = base().platforms(Vec::new()).build().unwrap_err();
        assert!(matches!(err, ValidationError::NoPlatforms));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = base().app_name("  ").build().unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("app_name")));
    }

    #[test]
    fn rejects_non_semver_versions() {
        let err = base().version("1.0").build().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVersion { .. }));
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = base().web_url("ftp://example.com").build().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUrl { field: "web_url", .. }));
    }

    #[test]
    fn sanitizes_package_id_and_dedups_platforms() {
        let config = base()
            .package_id("com.My Company.app-x")
            .platforms([Platform::Ios, Platform::Web, Platform::Ios])
            .build()
            .unwrap();
        assert_eq!(config.package_id(), "com.mycompany.appx");
        assert_eq!(config.platforms(), &[Platform::Ios, Platform::Web]);
        assert_eq!(config.organization(), "mycompany");
    }

    #[test]
    fn artifact_stem_falls_back_for_symbol_names() {
        let config = base().app_name("!!!").build().unwrap();
        assert_eq!(config.artifact_stem(), "app");
        let config = base().app_name("My App").build().unwrap();
        assert_eq!(config.artifact_stem(), "myapp");
    }
}
