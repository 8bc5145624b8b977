//! Build orchestration for WebView app projects.
//!
//! This module turns a validated [`BuildConfig`] into compiled artifacts by
//! driving an external cross-platform toolchain:
//!
//! 1. Copy the project template into a per-job workspace
//! 2. Substitute app identity and feature toggles ([`template`])
//! 3. Generate a release keystore when Android needs one
//! 4. Rename the app and install its launcher icon
//! 5. Resolve dependencies once
//! 6. Build each requested [`Platform`] independently ([`BuildStep`])
//!
//! Jobs are submitted to a [`BuildOrchestrator`] and observed through
//! [`BuildJob`] snapshots.

pub mod builder;
pub mod config;
pub mod error;
pub mod platform;
pub mod settings;
pub mod template;
pub mod utils;

pub use builder::{
    Artifact, BuildJob, BuildOrchestrator, JobRegistry, JobStatus, PlatformOutcome, ToolStatus,
    WebhookPayload,
};
pub use config::{
    BuildConfig, BuildConfigBuilder, BuildRequest, FeatureToggles, SigningCredential,
    ValidationError, escape_dart, escape_double_quoted, escape_xml, sanitize_file_stem,
    sanitize_identifier,
};
pub use error::{Error, Result};
pub use platform::{ArtifactKind, BuildStep, BuildTarget, Platform};
pub use settings::{Settings, SettingsBuilder, ToolchainSettings};
