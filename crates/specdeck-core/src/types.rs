//! The four result shapes exchanged with presentation collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// DetectionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResult {
    pub fn found(path: PathBuf, version: Option<String>) -> Self {
        Self {
            found: true,
            path: Some(path),
            version,
            error: None,
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            found: false,
            path: None,
            version: None,
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandResult
// ---------------------------------------------------------------------------

/// Why a [`CommandResult`] failed. Lets hosts offer a retry-with-longer-timeout
/// hint without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The executable could not be resolved or started.
    Spawn,
    Timeout,
    OutputOverflow,
    /// Reading the child's output or waiting on it failed mid-run.
    Io,
    /// The process ran to completion with a non-zero status.
    ExitStatus,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Spawn => "spawn",
            FailureKind::Timeout => "timeout",
            FailureKind::OutputOverflow => "output_overflow",
            FailureKind::Io => "io",
            FailureKind::ExitStatus => "exit_status",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl CommandResult {
    pub fn succeeded(output: String, exit_code: i32) -> Self {
        Self {
            success: true,
            output,
            error: None,
            exit_code: Some(exit_code),
            failure: None,
        }
    }

    pub fn failed(
        kind: FailureKind,
        output: String,
        error: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self {
            success: false,
            output,
            error: Some(error.into()),
            exit_code,
            failure: Some(kind),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.failure == Some(FailureKind::Timeout)
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub is_initialized: bool,
    pub has_constitution: bool,
    pub has_specification: bool,
    pub has_plan: bool,
    pub has_tasks: bool,
    pub workspace_root: String,
}

impl ProjectStatus {
    /// The all-false status, used for missing roots, uninitialized projects
    /// and derivations that ran out of time.
    pub fn uninitialized(workspace_root: impl Into<String>) -> Self {
        Self {
            is_initialized: false,
            has_constitution: false,
            has_specification: false,
            has_plan: false,
            has_tasks: false,
            workspace_root: workspace_root.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FileChangeEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Changed => "changed",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Semantic role of a project file, derived from its relative path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    Constitution,
    Specification,
    Plan,
    Tasks,
    AgentCommand,
    Other,
}

impl FileRole {
    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::Constitution => "constitution",
            FileRole::Specification => "specification",
            FileRole::Plan => "plan",
            FileRole::Tasks => "tasks",
            FileRole::AgentCommand => "agent_command",
            FileRole::Other => "other",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub path: PathBuf,
    pub relative_path: String,
    pub role: FileRole,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
