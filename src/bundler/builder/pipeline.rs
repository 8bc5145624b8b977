//! The per-job build pipeline.

use super::{
    branding,
    job::{BuildJob, JobStatus, PlatformOutcome},
    registry::JobRegistry,
    signing,
};
use crate::bundler::{
    BuildConfig, BuildStep, Error, Platform, Result, Settings, SigningCredential,
    error::Context,
    template,
    utils::{
        fs::{copy_dir, create_dir_all, remove_dir_all},
        process::run_tool,
    },
};
use std::{collections::BTreeMap, path::PathBuf, sync::Arc, time::Duration};
use uuid::Uuid;

const DEPENDENCIES_TIMEOUT: Duration = Duration::from_secs(180);

/// Progress at which the first platform build starts.
const BUILD_START: f64 = 28.0;
/// Progress shared by all platform builds.
const BUILD_SPAN: f64 = 65.0;

/// What a successful pipeline hands back to the job record.
struct Completion {
    outputs: BTreeMap<Platform, PlatformOutcome>,
    generated: Option<SigningCredential>,
}

/// One job's worker. Owns the job's record in the registry until it is
/// terminal.
#[derive(Clone)]
pub(super) struct Pipeline {
    id: Uuid,
    config: Arc<BuildConfig>,
    settings: Arc<Settings>,
    registry: JobRegistry,
}

impl Pipeline {
    pub(super) fn new(
        id: Uuid,
        config: Arc<BuildConfig>,
        settings: Arc<Settings>,
        registry: JobRegistry,
    ) -> Self {
        Self {
            id,
            config,
            settings,
            registry,
        }
    }

    fn project_dir(&self) -> PathBuf {
        self.settings.job_dir(&self.id).join("project")
    }

    /// Runs every stage and publishes the terminal record.
    ///
    /// Stages run on their own task so that a panic ends the job in `error`
    /// instead of leaving it stuck. The project workspace is removed on every
    /// exit path.
    pub(super) async fn run(self) -> BuildJob {
        log::info!("Build {} started for {:?}", self.id, self.config.platforms());

        let outcome = match tokio::spawn(self.clone().execute()).await {
            Ok(result) => result,
            Err(join) => Err(Error::from(join)),
        };
        let job = self.finish(outcome);

        let project_dir = self.project_dir();
        if let Err(e) = remove_dir_all(&project_dir).await {
            log::warn!("Failed to remove workspace {}: {e}", project_dir.display());
        }
        job
    }

    fn report(&self, status: JobStatus, progress: u8, message: impl Into<String>) {
        let message = message.into();
        log::info!("Build {}: [{status}] {message}", self.id);
        if let Some(current) = self.registry.get(&self.id) {
            self.registry.publish(current.advanced(status, progress, message));
        }
    }

    fn finish(&self, outcome: Result<Completion>) -> BuildJob {
        let current = self
            .registry
            .get(&self.id)
            .unwrap_or_else(|| BuildJob::new(self.id, self.config.platforms().to_vec()));

        let job = match outcome {
            Ok(done) => {
                let mut job = current.advanced(JobStatus::Completed, 100, "Build completed!");
                job.outputs = done.outputs;
                if let Some(credential) = done.generated {
                    job.keystore_generated = true;
                    job.keystore_path = Some(credential.keystore_path);
                    job.keystore_info_path = credential.info_path;
                }
                log::info!("Build {} completed", self.id);
                job
            }
            Err(e) => {
                let mut job = current.advanced(
                    JobStatus::Error,
                    current.progress,
                    format!("Build failed: {e}"),
                );
                job.outputs.clear();
                job.error = Some(e.to_string());
                log::error!("Build {} failed: {e}", self.id);
                job
            }
        };

        self.registry.publish(job.clone());
        self.registry.get(&self.id).unwrap_or(job)
    }

    async fn execute(self) -> Result<Completion> {
        let config = self.config.as_ref();
        let toolchain = self.settings.toolchain();
        let job_dir = self.settings.job_dir(&self.id);
        let project_dir = self.project_dir();

        self.report(JobStatus::Preparing, 5, "Preparing build environment...");
        create_dir_all(&job_dir, false).await?;
        copy_dir(self.settings.template_dir(), &project_dir)
            .await
            .context("copying project template")?;

        self.report(JobStatus::Configuring, 10, "Configuring app...");
        let changed = template::configure_project(&project_dir, config)
            .await
            .context("configuring project")?;
        log::debug!("Build {}: {changed} project files updated", self.id);

        let mut signing = config.existing_credential().cloned();
        let mut generated = None;
        if config.wants_android() && signing.is_none() {
            self.report(JobStatus::Keystore, 12, "Generating signing keystore...");
            generated =
                signing::generate_keystore(&toolchain.keytool, &job_dir.join("keystore"), config)
                    .await;
            signing = generated.clone();
        }

        self.report(JobStatus::Renaming, 15, "Setting app name and bundle ID...");
        branding::rename_app(toolchain, &project_dir, config).await;

        if let Some(icon) = config.icon_path().filter(|p| p.is_file()) {
            self.report(JobStatus::Icons, 18, "Generating app icons...");
            branding::install_icon(toolchain, &project_dir, icon).await;
        }

        log::info!("Build {}: updating platform configuration", self.id);
        let changed = template::configure_platforms(&project_dir, config, signing.as_ref())
            .await
            .context("configuring platforms")?;
        log::debug!("Build {}: {changed} platform files updated", self.id);

        self.report(JobStatus::Dependencies, 22, "Getting dependencies...");
        run_tool(
            &toolchain.flutter,
            ["pub", "get"],
            Some(&project_dir),
            DEPENDENCIES_TIMEOUT,
        )
        .await?
        .into_result()
        .context("resolving dependencies")?;

        let outputs_dir = job_dir.join("outputs");
        create_dir_all(&outputs_dir, false).await?;
        let step = BuildStep::new(&toolchain.flutter, &project_dir, &outputs_dir);

        let platforms = config.platforms();
        let share = BUILD_SPAN / platforms.len().max(1) as f64;
        let mut outputs = BTreeMap::new();

        for (i, platform) in platforms.iter().copied().enumerate() {
            let progress = (BUILD_START + share * i as f64) as u8;
            self.report(
                JobStatus::Building,
                progress,
                format!("Building {}...", platform.display_name()),
            );

            let outcome = match step.run(platform, config).await {
                Ok(Some(path)) => PlatformOutcome::Built(path),
                Ok(None) => PlatformOutcome::Failed("build finished without an artifact".into()),
                Err(e) => {
                    log::warn!("Build {}: {} failed: {e}", self.id, platform.display_name());
                    PlatformOutcome::Failed(e.to_string())
                }
            };
            outputs.insert(platform, outcome);
        }

        Ok(Completion { outputs, generated })
    }
}
