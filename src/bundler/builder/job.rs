//! Build job records.

use crate::bundler::Platform;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::{collections::BTreeMap, fmt, path::PathBuf};
use uuid::Uuid;

/// Lifecycle stage of a build job.
///
/// Variants are declared in pipeline order; a job's status never moves to an
/// earlier variant. `Completed` and `Error` are terminal.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Preparing,
    Configuring,
    Keystore,
    Renaming,
    Icons,
    Dependencies,
    Building,
    Completed,
    Error,
}

impl JobStatus {
    /// True for `completed` and `error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Preparing => "preparing",
            JobStatus::Configuring => "configuring",
            JobStatus::Keystore => "keystore",
            JobStatus::Renaming => "renaming",
            JobStatus::Icons => "icons",
            JobStatus::Dependencies => "dependencies",
            JobStatus::Building => "building",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one platform build step.
///
/// Serialized as the artifact path on success and as `"Error: <reason>"` on
/// failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformOutcome {
    Built(PathBuf),
    Failed(String),
}

impl PlatformOutcome {
    /// Artifact path, when the build succeeded.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            PlatformOutcome::Built(path) => Some(path),
            PlatformOutcome::Failed(_) => None,
        }
    }
}

impl fmt::Display for PlatformOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformOutcome::Built(path) => write!(f, "{}", path.display()),
            PlatformOutcome::Failed(reason) => write!(f, "Error: {reason}"),
        }
    }
}

impl Serialize for PlatformOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Snapshot of one build job.
///
/// Records are replaced whole on every transition, so a reader always sees a
/// consistent status, progress and message.
#[derive(Clone, Debug, Serialize)]
pub struct BuildJob {
    pub id: Uuid,
    pub status: JobStatus,
    /// 0..=100, non-decreasing.
    pub progress: u8,
    pub message: String,
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<Platform, PlatformOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub keystore_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keystore_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keystore_info_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuildJob {
    /// A freshly accepted job, not yet picked up by its worker.
    pub fn new(id: Uuid, platforms: Vec<Platform>) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Preparing,
            progress: 0,
            message: "Build queued".to_string(),
            platforms,
            outputs: BTreeMap::new(),
            error: None,
            keystore_generated: false,
            keystore_path: None,
            keystore_info_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this snapshot moved to a new stage.
    pub fn advanced(&self, status: JobStatus, progress: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            progress: progress.min(100),
            message: message.into(),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// True once the job reached `completed` or `error`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
