//! Builder for constructing Settings.

use super::{Settings, ToolchainSettings};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Default upper bound on uploads: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Default webhook timeout.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for constructing [`Settings`].
///
/// Only the base directory is required; every other location defaults to a
/// fixed subdirectory of it.
///
/// # Examples
///
/// ```
/// use swab::bundler::SettingsBuilder;
///
/// let settings = SettingsBuilder::new()
///     .base_dir("/srv/swab")
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.upload_dir(), std::path::Path::new("/srv/swab/uploads"));
/// assert_eq!(
///     settings.template_dir(),
///     std::path::Path::new("/srv/swab/templates/webview_app")
/// );
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    base_dir: Option<PathBuf>,
    upload_dir: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    template_dir: Option<PathBuf>,
    max_upload_bytes: Option<u64>,
    webhook_timeout: Option<Duration>,
    toolchain: ToolchainSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the installation directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn base_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.base_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the asset directory.
    ///
    /// Default: `<base_dir>/uploads`
    pub fn upload_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.upload_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the per-job directory root.
    ///
    /// Default: `<base_dir>/builds`
    pub fn build_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the project template directory.
    ///
    /// Default: `<base_dir>/templates/webview_app`
    pub fn template_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.template_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the maximum upload size in bytes.
    ///
    /// Default: [`DEFAULT_MAX_UPLOAD_BYTES`]
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Sets the webhook POST timeout.
    ///
    /// Default: [`DEFAULT_WEBHOOK_TIMEOUT`]
    pub fn webhook_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = Some(timeout);
        self
    }

    /// Sets all external tool locations.
    pub fn toolchain(mut self, toolchain: ToolchainSettings) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Sets the build toolchain executable.
    pub fn flutter<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.toolchain.flutter = path.as_ref().to_path_buf();
        self
    }

    /// Sets the script runner executable.
    pub fn dart<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.toolchain.dart = path.as_ref().to_path_buf();
        self
    }

    /// Sets the key generation executable.
    pub fn keytool<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.toolchain.keytool = path.as_ref().to_path_buf();
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_dir` is missing or a directory cannot be
    /// made absolute. All directories are resolved against the current
    /// working directory.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let base_dir = absolute(self.base_dir.context("base_dir is required")?)?;
        let upload_dir = match self.upload_dir {
            Some(dir) => absolute(dir)?,
            None => base_dir.join("uploads"),
        };
        let build_dir = match self.build_dir {
            Some(dir) => absolute(dir)?,
            None => base_dir.join("builds"),
        };
        let template_dir = match self.template_dir {
            Some(dir) => absolute(dir)?,
            None => base_dir.join("templates").join("webview_app"),
        };

        Ok(Settings {
            upload_dir,
            build_dir,
            template_dir,
            max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            webhook_timeout: self.webhook_timeout.unwrap_or(DEFAULT_WEBHOOK_TIMEOUT),
            toolchain: self.toolchain,
            base_dir,
        })
    }
}

fn absolute(path: PathBuf) -> crate::bundler::Result<PathBuf> {
    use crate::bundler::error::ErrorExt;

    std::path::absolute(&path).fs_context("resolving", path)
}
