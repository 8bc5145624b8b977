//! Error types for the build pipeline.
//!
//! Every fallible pipeline operation returns [`Result`]. The [`Context`] and
//! [`ErrorExt`] helpers attach human-readable context the same way across
//! templating, tool invocation and artifact handling.

use std::{fmt::Display, path::PathBuf, time::Duration};

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while preparing, templating and building a project.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error wrapped with additional context.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// Free-form failure.
    #[error("{0}")]
    GenericError(String),

    /// Raw IO failure.
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    /// Filesystem failure on a known path.
    #[error("failed while {context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// External executable could not be started.
    #[error("`{tool}` was not found or could not be started: {error}")]
    ToolNotFound {
        /// Program name or path
        tool: String,
        /// Spawn error
        error: std::io::Error,
    },

    /// External executable exceeded its time budget and was killed.
    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    ToolTimedOut {
        /// Rendered command line
        command: String,
        /// Budget that elapsed
        timeout: Duration,
    },

    /// External executable exited unsuccessfully.
    #[error("`{command}` exited with {}: {stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "signal".into()))]
    ToolFailed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Trimmed tail of captured stderr
        stderr: String,
    },

    /// Zip read/write failure.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory walk failure.
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix failure while relativizing walked entries.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Invalid rewrite pattern.
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A worker task died before finishing.
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Attach context to a fallible value.
pub trait Context<T> {
    /// Wrap the error with a static context message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the error with a lazily built context message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attach a path to IO errors.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`] naming the operation and path.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Return early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
