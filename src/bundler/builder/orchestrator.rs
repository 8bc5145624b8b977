//! Build job orchestration.
//!
//! This module provides the [`BuildOrchestrator`], which accepts validated
//! configurations, runs one pipeline task per job and answers status
//! queries from the shared [`JobRegistry`].

use super::{
    job::BuildJob,
    pipeline::Pipeline,
    registry::JobRegistry,
    webhook::{self, WebhookPayload},
};
use crate::bundler::{BuildConfig, Settings};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Accepts build jobs and tracks them to completion.
///
/// Every accepted job gets a fresh id, a record in the registry that is
/// visible before its worker starts, and its own task. There is no
/// cancellation: a job runs until it is `completed` or `error`.
///
/// # Examples
///
/// ```no_run
/// use swab::bundler::{BuildConfigBuilder, BuildOrchestrator, Platform, SettingsBuilder};
///
/// # async fn example() -> swab::bundler::Result<()> {
/// let settings = SettingsBuilder::new().base_dir("/srv/swab").build()?;
/// let orchestrator = BuildOrchestrator::new(settings);
///
/// let config = BuildConfigBuilder::new()
///     .app_name("Shop")
///     .description("Shop app")
///     .version("1.0.0")
///     .build_number(1)
///     .package_id("com.shop.app")
///     .web_url("https://shop.example.com")
///     .platforms([Platform::Android])
///     .build()
///     .expect("valid config");
///
/// let id = orchestrator.submit(config);
/// let job = orchestrator.wait(&id).await.expect("job exists");
/// println!("{}: {}", job.status, job.message);
/// # Ok(())
/// # }
/// ```
pub struct BuildOrchestrator {
    settings: Arc<Settings>,
    registry: JobRegistry,
    client: reqwest::Client,
    tasks: Mutex<HashMap<Uuid, JoinHandle<BuildJob>>>,
}

impl std::fmt::Debug for BuildOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("settings", &self.settings)
            .field("jobs", &self.registry.len())
            .finish()
    }
}

impl BuildOrchestrator {
    /// Creates an orchestrator with its own empty registry.
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, JobRegistry::new())
    }

    /// Creates an orchestrator over an existing registry.
    pub fn with_registry(settings: Settings, registry: JobRegistry) -> Self {
        Self {
            settings: Arc::new(settings),
            registry,
            client: reqwest::Client::new(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Accepts a job and starts its pipeline. Returns immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, config: BuildConfig) -> Uuid {
        let id = loop {
            let id = Uuid::new_v4();
            if self
                .registry
                .insert(BuildJob::new(id, config.platforms().to_vec()))
            {
                break id;
            }
        };
        log::info!("Accepted build {} ({})", id, config.app_name());

        let webhook_url = config.webhook_url().cloned();
        let pipeline = Pipeline::new(
            id,
            Arc::new(config),
            Arc::clone(&self.settings),
            self.registry.clone(),
        );
        let client = self.client.clone();
        let timeout = self.settings.webhook_timeout();

        let handle = tokio::spawn(async move {
            let job = pipeline.run().await;
            if let Some(url) = webhook_url {
                webhook::dispatch(client, url, WebhookPayload::from_job(&job), timeout);
            }
            job
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.insert(id, handle);
        id
    }

    /// Current snapshot of a job, or `None` for an unknown id.
    ///
    /// Once the job's worker has finished its handle is released, so jobs
    /// that are only polled do not hold on to it.
    pub fn status(&self, id: &Uuid) -> Option<BuildJob> {
        let job = self.registry.get(id)?;
        if job.is_terminal() {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            if tasks.get(id).is_some_and(JoinHandle::is_finished) {
                tasks.remove(id);
            }
        }
        Some(job)
    }

    /// Number of workers whose handles are still held.
    pub fn active_tasks(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Waits for a job's worker to finish and returns its final snapshot.
    ///
    /// Returns the current snapshot at once if the job was already awaited or
    /// its worker has already been released.
    pub async fn wait(&self, id: &Uuid) -> Option<BuildJob> {
        let handle = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log::error!("Worker for build {id} died: {e}");
            }
        }
        self.status(id)
    }
}
