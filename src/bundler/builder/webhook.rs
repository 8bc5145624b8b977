//! Terminal-state notifications.

use super::job::{BuildJob, JobStatus, PlatformOutcome};
use crate::bundler::{Platform, utils::http::post_json};
use serde::Serialize;
use std::{collections::BTreeMap, time::Duration};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Body POSTed to a job's webhook URL.
#[derive(Clone, Debug, Serialize)]
pub struct WebhookPayload {
    pub build_id: Uuid,
    pub status: JobStatus,
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<Platform, PlatformOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookPayload {
    /// Payload describing a terminal job: outputs on success, the error
    /// description otherwise.
    pub fn from_job(job: &BuildJob) -> Self {
        let failed = job.status == JobStatus::Error;
        Self {
            build_id: job.id,
            status: job.status,
            platforms: job.platforms.clone(),
            outputs: (!failed).then(|| job.outputs.clone()),
            error: if failed {
                Some(job.error.clone().unwrap_or_else(|| job.message.clone()))
            } else {
                None
            },
        }
    }
}

/// Sends `payload` on a detached task.
///
/// Delivery is attempted once; every failure is logged and dropped. The
/// returned handle is only useful to tests.
pub fn dispatch(
    client: reqwest::Client,
    url: url::Url,
    payload: WebhookPayload,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match post_json(&client, url.as_str(), &payload, timeout).await {
            Ok(()) => log::info!("Webhook delivered for build {}", payload.build_id),
            Err(e) => log::warn!("Webhook notification failed for build {}: {e}", payload.build_id),
        }
    })
}
