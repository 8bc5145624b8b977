//! Top-level error types for the service facade and the CLI.
//!
//! Pipeline, validation and archive errors keep their own enums; this module
//! wraps them with the caller-facing conditions of the external interface.

use crate::{bundler::Platform, bundler::ValidationError, project::ArchiveError};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for service and CLI operations
pub type Result<T> = std::result::Result<T, SwabError>;

/// Main error type for all service operations
#[derive(Error, Debug)]
pub enum SwabError {
    /// Pipeline errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Submission rejected before a job was created
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Project file errors
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// No job with this id
    #[error("Build not found: {0}")]
    JobNotFound(Uuid),

    /// The job has not reached `completed`
    #[error("Build {0} is not completed")]
    JobNotCompleted(Uuid),

    /// The requested artifact does not exist
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// The platform's build failed; carries the recorded error string
    #[error("{platform} build failed: {message}")]
    PlatformFailed {
        /// Failed platform
        platform: Platform,
        /// Recorded outcome
        message: String,
    },

    /// Rejected asset upload
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl SwabError {
    /// True when a project file failed authentication on this host.
    pub fn is_wrong_key(&self) -> bool {
        matches!(self, SwabError::Archive(ArchiveError::WrongKey))
    }

    /// True for conditions a caller reports as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SwabError::JobNotFound(_) | SwabError::ArtifactNotFound(_)
        )
    }
}
