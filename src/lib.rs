//! WebView app build orchestration and encrypted project files.
//!
//! This library drives an external cross-platform toolchain to build a
//! WebView wrapper app for several targets from one configuration:
//! - Templating of a project tree with app identity and feature toggles
//! - Release keystore generation for Android
//! - Per-platform builds with stable artifact locations
//! - Job tracking with progress snapshots and webhooks
//!
//! It also saves and opens portable project files encrypted with a
//! host-bound key. It can be used both as a CLI tool and as a library
//! dependency.

pub mod assets;
pub mod bundler;
pub mod cli;
pub mod error;
pub mod project;
pub mod service;

// Re-export commonly used types
pub use error::{CliError, Result, SwabError};
pub use service::{ArtifactSelector, OpenedProject, SavedProject, SwabService};
