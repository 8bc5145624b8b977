//! Core Settings struct and implementations.

use super::ToolchainSettings;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Runtime settings for the build service.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). Owns every
/// filesystem location the service writes to and the external tools it
/// invokes.
///
/// # Layout
///
/// ```text
/// <base_dir>/
///   uploads/                    stored assets
///   builds/<job id>/outputs/    per-job artifacts
///   builds/<job id>/keystore/   generated signing credential
///   builds/saved_projects/      encrypted project files
///   templates/webview_app/      toolchain project template
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    pub(super) base_dir: PathBuf,
    pub(super) upload_dir: PathBuf,
    pub(super) build_dir: PathBuf,
    pub(super) template_dir: PathBuf,
    pub(super) max_upload_bytes: u64,
    pub(super) webhook_timeout: Duration,
    pub(super) toolchain: ToolchainSettings,
}

impl Settings {
    /// Installation directory; also part of the machine key material.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding uploaded and restored assets.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Root of all per-job directories.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Toolchain project template copied into every job.
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Directory for saved project files.
    pub fn saved_projects_dir(&self) -> PathBuf {
        self.build_dir.join("saved_projects")
    }

    /// Directory owned by one job.
    pub fn job_dir(&self, job_id: &uuid::Uuid) -> PathBuf {
        self.build_dir.join(job_id.to_string())
    }

    /// Upper bound on uploaded assets and opened project files.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Timeout for one webhook POST.
    pub fn webhook_timeout(&self) -> Duration {
        self.webhook_timeout
    }

    /// External executables.
    pub fn toolchain(&self) -> &ToolchainSettings {
        &self.toolchain
    }
}
