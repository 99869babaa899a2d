//! Subprocess execution with a timeout and a bounded capture buffer.
//!
//! [`run`] spawns exactly one child and resolves exactly once: the child's
//! completion and the timer race inside a single `tokio::time::timeout`, and
//! whichever loses is dropped. Every outcome, including spawn failure, is
//! folded into a [`CommandResult`]; nothing here returns `Err`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::platform;
use crate::types::{CommandResult, FailureKind};

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Ceiling on stdout + stderr combined.
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory. Inherits the parent's when `None`.
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
    /// Extra variables layered over the inherited environment.
    pub env: Vec<(String, String)>,
    /// Directories appended to the child's `PATH`.
    pub extra_path: Vec<PathBuf>,
    pub max_output_bytes: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
            env: Vec::new(),
            extra_path: platform::search_dirs(),
            max_output_bytes: MAX_OUTPUT_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

enum RunError {
    Overflow,
    Io(std::io::Error),
}

/// Shared byte budget plus the two capture buffers. Buffers live outside the
/// racing future so partial output survives a timeout.
struct Capture {
    limit: usize,
    used: AtomicUsize,
    stdout: Mutex<Vec<u8>>,
    stderr: Mutex<Vec<u8>>,
}

impl Capture {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
            stdout: Mutex::new(Vec::new()),
            stderr: Mutex::new(Vec::new()),
        }
    }

    fn take(buf: &Mutex<Vec<u8>>) -> String {
        let bytes = std::mem::take(&mut *buf.lock().unwrap_or_else(|e| e.into_inner()));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

async fn drain<R: AsyncRead + Unpin>(
    reader: Option<R>,
    capture: &Capture,
    sink: &Mutex<Vec<u8>>,
) -> Result<(), RunError> {
    let Some(mut reader) = reader else {
        return Ok(());
    };
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await.map_err(RunError::Io)?;
        if n == 0 {
            return Ok(());
        }
        let used = capture.used.fetch_add(n, Ordering::Relaxed) + n;
        if used > capture.limit {
            return Err(RunError::Overflow);
        }
        sink.lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(&chunk[..n]);
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Run `executable args...` and capture its output verbatim.
///
/// Output is returned unsanitized; callers that show it to users go through
/// [`crate::sanitize::sanitize`].
pub async fn run(executable: &Path, args: &[String], opts: &RunOptions) -> CommandResult {
    let started = Instant::now();
    let mut cmd = Command::new(executable);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(cwd) = &opts.cwd {
        cmd.current_dir(cwd);
    }
    if let Some(path) = platform::augment_path(std::env::var_os("PATH"), &opts.extra_path) {
        cmd.env("PATH", path);
    }
    for (k, v) in &opts.env {
        cmd.env(k, v);
    }

    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(exe = %executable.display(), error = %e, "spawn failed");
            return CommandResult::failed(
                FailureKind::Spawn,
                String::new(),
                format!("failed to start '{}': {e}", executable.display()),
                None,
            );
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let capture = Capture::new(opts.max_output_bytes);

    let completion = async {
        tokio::try_join!(
            drain(stdout, &capture, &capture.stdout),
            drain(stderr, &capture, &capture.stderr)
        )?;
        child.wait().await.map_err(RunError::Io)
    };
    let outcome = tokio::time::timeout(opts.timeout, completion).await;

    let result = match outcome {
        Err(_elapsed) => {
            let _ = child.kill().await;
            CommandResult::failed(
                FailureKind::Timeout,
                Capture::take(&capture.stdout),
                timeout_message(opts.timeout),
                Some(-1),
            )
        }
        Ok(Err(RunError::Overflow)) => {
            let _ = child.kill().await;
            CommandResult::failed(
                FailureKind::OutputOverflow,
                String::new(),
                format!(
                    "output exceeded the {} byte capture limit; the command was stopped",
                    opts.max_output_bytes
                ),
                Some(-1),
            )
        }
        Ok(Err(RunError::Io(e))) => {
            let _ = child.kill().await;
            CommandResult::failed(
                FailureKind::Io,
                Capture::take(&capture.stdout),
                format!("I/O error while running '{}': {e}", executable.display()),
                None,
            )
        }
        Ok(Ok(status)) => finished(
            status,
            Capture::take(&capture.stdout),
            Capture::take(&capture.stderr),
        ),
    };

    tracing::debug!(
        exe = %executable.display(),
        args = ?args,
        success = result.success,
        exit_code = ?result.exit_code,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "command finished"
    );
    result
}

fn finished(status: ExitStatus, stdout: String, stderr: String) -> CommandResult {
    let code = status.code();
    if status.success() {
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "command wrote to stderr");
        }
        return CommandResult::succeeded(stdout, code.unwrap_or(0));
    }

    let error = if !stderr.trim().is_empty() {
        stderr
    } else if let Some(code) = code {
        format!("process exited with code {code}")
    } else {
        "process terminated by signal".to_string()
    };
    CommandResult::failed(FailureKind::ExitStatus, stdout, error, Some(code.unwrap_or(-1)))
}

pub fn timeout_message(timeout: Duration) -> String {
    let shown = describe_duration(timeout);
    format!(
        "command timed out after {shown}. Increase the command timeout setting \
         (currently {shown}) and try again"
    )
}

fn describe_duration(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
