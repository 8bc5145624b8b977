//! Caller-facing operations.
//!
//! [`SwabService`] bundles the build orchestrator, the asset store and the
//! project file codec behind the operations a front end exposes: submit,
//! status, artifact retrieval, uploads, and project save/open.

use crate::{
    assets::AssetStore,
    bundler::{
        Artifact, BuildJob, BuildOrchestrator, BuildRequest, JobStatus, Platform, PlatformOutcome,
        Settings, ToolStatus, builder::tool_detection, error::ErrorExt, utils::archive::zip_dir,
    },
    error::{Result, SwabError},
    project::{self, EXTENSION, IconAsset, MachineKey, ProjectBundle, ProjectDocument},
};
use serde_json::Value;
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

/// File name of the zipped signing credential inside a job's outputs.
pub const KEYSTORE_BUNDLE_FILE: &str = "keystore-bundle.zip";

/// What to fetch from a completed job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactSelector {
    /// One platform's artifact.
    Platform(Platform),
    /// The generated keystore and its credential record, zipped.
    KeystoreBundle,
}

impl FromStr for ArtifactSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("keystore") {
            Ok(ArtifactSelector::KeystoreBundle)
        } else {
            s.parse().map(ArtifactSelector::Platform)
        }
    }
}

impl fmt::Display for ArtifactSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactSelector::Platform(p) => f.write_str(p.as_str()),
            ArtifactSelector::KeystoreBundle => f.write_str("keystore"),
        }
    }
}

/// A project file written by [`SwabService::save_project`].
#[derive(Clone, Debug)]
pub struct SavedProject {
    pub path: PathBuf,
    pub file_name: String,
}

/// A decrypted project with its assets stored for reuse.
#[derive(Clone, Debug)]
pub struct OpenedProject {
    pub document: ProjectDocument,
    pub icon_path: Option<PathBuf>,
    pub keystore_path: Option<PathBuf>,
}

impl OpenedProject {
    /// The document as a submission payload, with restored asset paths set.
    pub fn to_json(&self) -> Result<Value> {
        let mut value = serde_json::to_value(&self.document)?;
        if let Value::Object(map) = &mut value {
            if let Some(icon) = &self.icon_path {
                map.insert("icon_path".into(), Value::String(icon.display().to_string()));
            }
            if let Some(keystore) = &self.keystore_path {
                map.insert(
                    "keystore_path".into(),
                    Value::String(keystore.display().to_string()),
                );
            }
        }
        Ok(value)
    }
}

/// Build service facade.
#[derive(Debug)]
pub struct SwabService {
    orchestrator: BuildOrchestrator,
    assets: AssetStore,
}

impl SwabService {
    pub fn new(settings: Settings) -> Self {
        let assets = AssetStore::new(&settings);
        Self {
            orchestrator: BuildOrchestrator::new(settings),
            assets,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.orchestrator.settings()
    }

    pub fn orchestrator(&self) -> &BuildOrchestrator {
        &self.orchestrator
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Validates a JSON submission and starts its job.
    pub fn submit(&self, payload: Value) -> Result<Uuid> {
        self.submit_request(BuildRequest::from_json(payload)?)
    }

    /// Validates a parsed submission and starts its job.
    pub fn submit_request(&self, request: BuildRequest) -> Result<Uuid> {
        let config = request.validate()?;
        Ok(self.orchestrator.submit(config))
    }

    pub fn status(&self, id: &Uuid) -> Result<BuildJob> {
        self.orchestrator.status(id).ok_or(SwabError::JobNotFound(*id))
    }

    /// Waits for a job to reach a terminal state.
    pub async fn wait(&self, id: &Uuid) -> Result<BuildJob> {
        self.orchestrator
            .wait(id)
            .await
            .ok_or(SwabError::JobNotFound(*id))
    }

    /// Locates a finished artifact and describes it.
    pub async fn artifact(&self, id: &Uuid, selector: ArtifactSelector) -> Result<Artifact> {
        let job = self.status(id)?;
        if job.status != JobStatus::Completed {
            return Err(SwabError::JobNotCompleted(*id));
        }

        let path = match selector {
            ArtifactSelector::KeystoreBundle => self.keystore_bundle(&job).await?,
            ArtifactSelector::Platform(platform) => match job.outputs.get(&platform) {
                Some(PlatformOutcome::Built(path)) => path.clone(),
                Some(failed @ PlatformOutcome::Failed(_)) => {
                    return Err(SwabError::PlatformFailed {
                        platform,
                        message: failed.to_string(),
                    });
                }
                None => {
                    return Err(SwabError::ArtifactNotFound(format!(
                        "{platform} was not built by this job"
                    )));
                }
            },
        };

        if !path.is_file() {
            return Err(SwabError::ArtifactNotFound("Output file not found".into()));
        }
        Ok(Artifact::describe(&path).await?)
    }

    async fn keystore_bundle(&self, job: &BuildJob) -> Result<PathBuf> {
        let keystore_dir = job
            .keystore_path
            .as_deref()
            .filter(|_| job.keystore_generated)
            .and_then(Path::parent)
            .ok_or_else(|| SwabError::ArtifactNotFound("No keystore was generated".into()))?;
        if !keystore_dir.is_dir() {
            return Err(SwabError::ArtifactNotFound("Keystore not found".into()));
        }

        let dest = self
            .settings()
            .job_dir(&job.id)
            .join("outputs")
            .join(KEYSTORE_BUNDLE_FILE);
        // The keystore directory is fixed once the job completes.
        if !dest.is_file() {
            let entries = zip_dir(keystore_dir, &dest).await?;
            log::info!("Bundled {entries} keystore file(s) into {}", dest.display());
        }
        Ok(dest)
    }

    pub async fn upload_icon(&self, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.assets.store_icon(original_name, bytes).await
    }

    pub async fn upload_keystore(&self, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.assets.store_keystore(original_name, bytes).await
    }

    /// Encrypts a submission-shaped document into `saved_projects/`.
    ///
    /// Existing files at `icon_path` and `keystore_path` are embedded;
    /// missing ones are skipped.
    pub async fn save_project(&self, payload: Value) -> Result<SavedProject> {
        let icon_path = path_field(&payload, "icon_path");
        let keystore_path = path_field(&payload, "keystore_path");
        let document = ProjectDocument::from_json(payload).map_err(project::ArchiveError::from)?;

        let icon = match icon_path.filter(|p| p.is_file()) {
            Some(path) => read_icon(&path).await?,
            None => None,
        };
        let keystore = match keystore_path.filter(|p| p.is_file()) {
            Some(path) => Some(
                tokio::fs::read(&path)
                    .await
                    .fs_context("reading keystore", &path)?,
            ),
            None => None,
        };

        let file_name = document.file_name();
        let bundle = ProjectBundle {
            document,
            icon,
            keystore,
        };
        let install_dir = self.settings().base_dir().to_path_buf();
        let sealed = tokio::task::spawn_blocking(move || {
            project::encode(&MachineKey::for_host(&install_dir), &bundle)
        })
        .await
        .map_err(crate::bundler::Error::from)??;

        let dir = self.settings().saved_projects_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .fs_context("creating directory", &dir)?;
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &sealed)
            .await
            .fs_context("writing project file", &path)?;
        log::info!("Saved project {}", path.display());

        Ok(SavedProject { path, file_name })
    }

    /// Reads and decrypts a project file from disk.
    pub async fn open_project_file(&self, path: &Path) -> Result<OpenedProject> {
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            return Err(SwabError::InvalidUpload(format!(
                "Invalid file type. Please select a .{EXTENSION} file"
            )));
        }
        let bytes = tokio::fs::read(path)
            .await
            .fs_context("reading project file", path)?;
        self.open_project(bytes).await
    }

    /// Decrypts a project file and stores its assets as fresh uploads.
    pub async fn open_project(&self, bytes: Vec<u8>) -> Result<OpenedProject> {
        let limit = self.settings().max_upload_bytes();
        if bytes.len() as u64 > limit {
            return Err(SwabError::InvalidUpload(format!(
                "project file exceeds the {limit} byte upload limit"
            )));
        }

        let install_dir = self.settings().base_dir().to_path_buf();
        let bundle = tokio::task::spawn_blocking(move || {
            project::decode(&MachineKey::for_host(&install_dir), &bytes, limit)
        })
        .await
        .map_err(crate::bundler::Error::from)??;

        let icon_path = match &bundle.icon {
            Some(icon) => Some(self.assets.restore_icon(icon).await?),
            None => None,
        };
        let keystore_path = match &bundle.keystore {
            Some(bytes) => Some(self.assets.restore_keystore(bytes).await?),
            None => None,
        };

        Ok(OpenedProject {
            document: bundle.document,
            icon_path,
            keystore_path,
        })
    }

    /// Resolution of every configured external tool.
    pub fn doctor(&self) -> Vec<ToolStatus> {
        tool_detection::detect(self.settings().toolchain())
    }
}

fn path_field(payload: &Value, field: &str) -> Option<PathBuf> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

async fn read_icon(path: &Path) -> Result<Option<IconAsset>> {
    let Some(extension) = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| project::ICON_EXTENSIONS.contains(&e.as_str()))
    else {
        log::warn!("Skipping icon with unsupported extension: {}", path.display());
        return Ok(None);
    };
    let bytes = tokio::fs::read(path).await.fs_context("reading icon", path)?;
    Ok(Some(IconAsset { extension, bytes }))
}
