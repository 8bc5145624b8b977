//! HTTP utilities for outbound notifications.
//!
//! Provides a single JSON POST with a hard timeout and no retries.

use crate::bundler::error::{Error, Result};
use serde::Serialize;
use std::time::Duration;

/// Posts `payload` as JSON to `url`, failing on transport errors, timeout,
/// or a non-success status.
///
/// Used by:
/// - Build webhooks (terminal job notifications)
pub async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    payload: &T,
    timeout: Duration,
) -> Result<()> {
    log::debug!("POST {}", url);

    let response = client
        .post(url)
        .timeout(timeout)
        .json(payload)
        .send()
        .await
        .map_err(|e| Error::GenericError(format!("POST {} failed: {}", url, e)))?;

    response
        .error_for_status()
        .map_err(|e| Error::GenericError(format!("POST {} rejected: {}", url, e)))?;

    Ok(())
}
