//! External tool execution with a bounded wait.
//!
//! Every toolchain invocation (Flutter, Dart, keytool) goes through
//! [`run_tool`], which captures output instead of streaming it and kills the
//! child when its timeout elapses.

use crate::bundler::error::{Error, Result};
use std::{
    ffi::OsStr,
    path::Path,
    process::Stdio,
    time::Duration,
};
use tokio::process::Command;

/// Maximum characters of stderr carried into error messages.
const STDERR_TAIL: usize = 2000;

/// Structured result of one external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Rendered command line, for logs and errors.
    pub command: String,
    /// Exit code; `None` when killed by a signal or timed out.
    pub code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Whether the timeout elapsed before the process exited.
    pub timed_out: bool,
    /// Timeout the process ran under.
    pub timeout: Duration,
}

impl ToolOutput {
    /// True when the process exited with code zero in time.
    pub fn success(&self) -> bool {
        !self.timed_out && self.code == Some(0)
    }

    /// Convert a timeout or non-zero exit into an error.
    pub fn into_result(self) -> Result<Self> {
        if self.timed_out {
            return Err(Error::ToolTimedOut {
                command: self.command,
                timeout: self.timeout,
            });
        }
        if self.code != Some(0) {
            return Err(Error::ToolFailed {
                stderr: tail(&self.stderr),
                command: self.command,
                code: self.code,
            });
        }
        Ok(self)
    }
}

/// Run `program` with `args` in `cwd`, waiting at most `timeout`.
///
/// Returns `Err(Error::ToolNotFound)` only when the process could not be
/// spawned. Timeouts and non-zero exits are reported through the returned
/// [`ToolOutput`] so callers decide whether they are hard or soft failures.
pub async fn run_tool<I, S>(
    program: &Path,
    args: I,
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args
        .into_iter()
        .map(|a| a.as_ref().to_os_string())
        .collect();
    let command = render_command(program, &args);
    log::debug!("Running `{}` (timeout {}s)", command, timeout.as_secs());

    let mut cmd = Command::new(program);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|error| Error::ToolNotFound {
        tool: program.display().to_string(),
        error,
    })?;
    let pid = child.id();

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(ToolOutput {
            command,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
            timeout,
        }),
        Ok(Err(e)) => Err(Error::GenericError(format!(
            "failed waiting for `{}`: {}",
            command, e
        ))),
        Err(_elapsed) => {
            // Dropping the wait future drops the child; kill_on_drop sends SIGKILL.
            log::warn!(
                "`{}` (pid {:?}) timed out after {}s, terminating",
                command,
                pid,
                timeout.as_secs()
            );
            Ok(ToolOutput {
                command,
                code: None,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
                timeout,
            })
        }
    }
}

fn render_command(program: &Path, args: &[std::ffi::OsString]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

fn tail(text: &str) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_TAIL {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - STDERR_TAIL).collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let out = run_tool(
            Path::new("sh"),
            ["-c", "echo hello; echo oops >&2; exit 3"],
            None,
            Duration::from_secs(10),
        )
        .await
        .unwrap();

        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert!(!out.success());
        assert!(matches!(
            out.into_result(),
            Err(Error::ToolFailed { code: Some(3), .. })
        ));
    }

    #[tokio::test]
    async fn timeout_is_reported_not_raised() {
        let out = run_tool(
            Path::new("sh"),
            ["-c", "sleep 5"],
            None,
            Duration::from_millis(100),
        )
        .await
        .unwrap();

        assert!(out.timed_out);
        assert!(matches!(out.into_result(), Err(Error::ToolTimedOut { .. })));
    }

    #[tokio::test]
    async fn missing_tool_is_tool_not_found() {
        let err = run_tool(
            Path::new("/nonexistent/swab-test-tool"),
            ["--version"],
            None,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_tool(Path::new("pwd"), Vec::<&str>::new(), Some(dir.path()), Duration::from_secs(5))
            .await
            .unwrap();
        let reported = std::fs::canonicalize(out.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
