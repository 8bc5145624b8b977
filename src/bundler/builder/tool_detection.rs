//! External tool availability checking.
//!
//! The pipeline itself never pre-checks tools: a missing executable surfaces
//! as a spawn failure at the step that needs it. This module backs the
//! `doctor` report.

use crate::bundler::ToolchainSettings;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Resolution result for one configured tool.
#[derive(Clone, Debug, Serialize)]
pub struct ToolStatus {
    pub name: &'static str,
    pub configured: PathBuf,
    pub resolved: Option<PathBuf>,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Resolves `program` the way a spawn would: bare names through `PATH`,
/// paths as given.
pub fn locate(program: &Path) -> Option<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program.display(), path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found: {}", program.display(), e);
            None
        }
    }
}

/// Checks every tool in `toolchain`.
pub fn detect(toolchain: &ToolchainSettings) -> Vec<ToolStatus> {
    toolchain
        .entries()
        .into_iter()
        .map(|(name, configured)| ToolStatus {
            name,
            configured: configured.clone(),
            resolved: locate(configured),
        })
        .collect()
}
