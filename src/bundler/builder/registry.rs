//! In-memory job registry.

use super::job::BuildJob;
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use uuid::Uuid;

/// Shared store of job snapshots.
///
/// Cheap to clone; clones share the same map. Each job has exactly one
/// writer (its worker) and any number of readers. Writes replace the whole
/// record under the lock, so readers never observe a half-applied update.
#[derive(Clone, Debug, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, BuildJob>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new job. Returns `false` if the id is already taken.
    pub fn insert(&self, job: BuildJob) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if jobs.contains_key(&job.id) {
            return false;
        }
        jobs.insert(job.id, job);
        true
    }

    /// Current snapshot of a job.
    pub fn get(&self, id: &Uuid) -> Option<BuildJob> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Replaces a job's snapshot.
    ///
    /// The update is refused when the job is unknown or already terminal.
    /// Status never moves backwards and progress never decreases; a
    /// lower value in `next` is raised to the current one.
    pub fn publish(&self, mut next: BuildJob) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = jobs.get(&next.id) else {
            log::warn!("Ignoring update for unknown job {}", next.id);
            return false;
        };
        if current.is_terminal() {
            log::warn!(
                "Ignoring update for job {}: already {}",
                next.id,
                current.status
            );
            return false;
        }
        if next.status < current.status {
            log::warn!(
                "Ignoring update for job {}: {} would regress from {}",
                next.id,
                next.status,
                current.status
            );
            return false;
        }
        next.progress = next.progress.max(current.progress);
        jobs.insert(next.id, next);
        true
    }

    /// Number of jobs ever accepted.
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
