//! The façade collaborators call: detection, command runs and project status
//! behind one cloneable handle.
//!
//! Nothing here returns `Err`. Locator misses, spawn failures, timeouts and
//! filesystem trouble all come back as data ([`DetectionResult`],
//! [`CommandResult`], [`ProjectStatus`]).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cache::{TtlCache, DETECTION_TTL, STATUS_TTL};
use crate::command::{InitOptions, SpecifyCommand};
use crate::config::Settings;
use crate::locator::Locator;
use crate::runner::{self, RunOptions};
use crate::sanitize::sanitize;
use crate::status;
use crate::types::{CommandResult, DetectionResult, FailureKind, FileChangeEvent, ProjectStatus};

struct Inner {
    settings: Settings,
    workspace_root: Option<PathBuf>,
    locator: Locator,
    detection: TtlCache<DetectionResult>,
    status: TtlCache<ProjectStatus>,
    status_ceiling: Duration,
}

#[derive(Clone)]
pub struct SpecifyService {
    inner: Arc<Inner>,
}

impl SpecifyService {
    pub fn new(settings: Settings, workspace_root: Option<PathBuf>) -> Self {
        Self::with_locator(settings, workspace_root, Locator::default())
    }

    /// Use `locator` for detection. `settings.auto_detect` still applies.
    pub fn with_locator(
        settings: Settings,
        workspace_root: Option<PathBuf>,
        locator: Locator,
    ) -> Self {
        let locator = locator.with_auto_detect(settings.auto_detect);
        Self {
            inner: Arc::new(Inner {
                settings,
                workspace_root,
                locator,
                detection: TtlCache::new(DETECTION_TTL),
                status: TtlCache::new(STATUS_TTL),
                status_ceiling: status::STATUS_DERIVE_TIMEOUT,
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.inner.workspace_root.as_deref()
    }

    // -----------------------------------------------------------------------
    // Detection
    // -----------------------------------------------------------------------

    pub async fn detect(&self, force_refresh: bool) -> DetectionResult {
        if !force_refresh {
            if let Some(cached) = self.inner.detection.get() {
                return cached;
            }
        }

        let custom = self.inner.settings.executable_path.as_deref();
        let result = self.inner.locator.locate(custom).await;
        if !result.found {
            if self.inner.settings.debug {
                tracing::debug!(result = ?result, "specify detection failed");
            } else {
                tracing::warn!("specify executable not found");
            }
        }
        self.inner.detection.put(result.clone());
        result
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub async fn run_init(&self, opts: InitOptions) -> CommandResult {
        self.run_command(SpecifyCommand::Init(opts)).await
    }

    pub async fn run_check(&self) -> CommandResult {
        self.run_command(SpecifyCommand::Check).await
    }

    pub async fn run_version(&self) -> CommandResult {
        self.run_command(SpecifyCommand::Version).await
    }

    pub async fn run_command(&self, command: SpecifyCommand) -> CommandResult {
        let detection = self.detect(false).await;
        let executable = match detection.path {
            Some(path) if detection.found => path,
            _ => {
                let reason = detection
                    .error
                    .unwrap_or_else(|| "specify executable not found".to_string());
                return CommandResult::failed(FailureKind::Spawn, String::new(), reason, None);
            }
        };

        let opts = RunOptions {
            cwd: self.inner.workspace_root.clone(),
            timeout: self.inner.settings.command_timeout(),
            ..Default::default()
        };

        tracing::info!(command = %command, "running");
        let raw = runner::run(&executable, &command.to_args(), &opts).await;

        if !raw.success {
            self.log_failure(&command, &raw);
            if raw.failure == Some(FailureKind::Spawn) {
                // The cached path no longer starts; look again next time.
                self.inner.detection.clear();
            }
        } else if command.mutates_workspace() {
            self.invalidate_status();
        }

        let error = raw.error.as_deref().map(|e| {
            let clean = sanitize(e);
            if clean.is_empty() {
                format!("{command} failed")
            } else {
                clean
            }
        });
        CommandResult {
            output: sanitize(&raw.output),
            error,
            ..raw
        }
    }

    fn log_failure(&self, command: &SpecifyCommand, raw: &CommandResult) {
        if self.inner.settings.debug {
            tracing::debug!(
                command = %command,
                failure = ?raw.failure,
                exit_code = ?raw.exit_code,
                error = ?raw.error,
                output = %raw.output,
                "command failed"
            );
        } else {
            tracing::warn!(
                command = %command,
                failure = ?raw.failure,
                exit_code = ?raw.exit_code,
                "command failed"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    pub async fn get_status(&self, force_refresh: bool) -> ProjectStatus {
        if !force_refresh {
            if let Some(cached) = self.inner.status.get() {
                return cached;
            }
        }
        let status = status::derive_status_within(
            self.workspace_root(),
            self.inner.settings.spec_scan,
            self.inner.status_ceiling,
        )
        .await;
        self.inner.status.put(status.clone());
        status
    }

    // -----------------------------------------------------------------------
    // Cache control
    // -----------------------------------------------------------------------

    pub fn clear_cache(&self) {
        self.inner.detection.clear();
        self.inner.status.clear();
    }

    pub fn invalidate_status(&self) {
        self.inner.status.clear();
    }

    /// Drop the status cache whenever a change batch arrives. The task ends
    /// when the sender closes or every service handle is gone.
    pub fn invalidate_on(
        &self,
        mut batches: broadcast::Receiver<Vec<FileChangeEvent>>,
    ) -> JoinHandle<()> {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            loop {
                let count = match batches.recv().await {
                    Ok(batch) => batch.len(),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "change batches lagged");
                        0
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                inner.status.clear();
                tracing::debug!(count, "status cache invalidated by file changes");
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
