//! Build job orchestration and coordination.
//!
//! This module provides the [`BuildOrchestrator`] that runs one pipeline per
//! job: project template copy, configuration, optional signing keystore,
//! renaming, icons, dependency resolution and one build step per platform.
//!
//! # Module Organization
//!
//! - [`checksum`] - Artifact metadata and SHA-256 checksums
//! - [`orchestrator`] - Job submission, status and completion tracking
//! - [`signing`] - Release keystore generation
//! - [`tool_detection`] - External tool availability checking
//! - `pipeline`, `registry`, `job`, `branding`, `webhook` - pipeline internals

mod branding;
pub mod checksum;
mod job;
mod orchestrator;
mod pipeline;
mod registry;
pub mod signing;
pub mod tool_detection;
mod webhook;

pub use checksum::Artifact;
pub use job::{BuildJob, JobStatus, PlatformOutcome};
pub use orchestrator::BuildOrchestrator;
pub use registry::JobRegistry;
pub use tool_detection::ToolStatus;
pub use webhook::WebhookPayload;
