//! Derive a [`ProjectStatus`] from what exists on disk.
//!
//! The derivation only ever asks "does this exist". Any filesystem error is
//! read as absent, and the whole derivation is bounded by
//! [`STATUS_DERIVE_TIMEOUT`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::SpecScan;
use crate::paths;
use crate::types::ProjectStatus;

/// Ceiling on one status derivation. Past it the all-false status is used.
pub const STATUS_DERIVE_TIMEOUT: Duration = Duration::from_millis(3000);

pub async fn derive_status(root: Option<&Path>, scan: SpecScan) -> ProjectStatus {
    derive_status_within(root, scan, STATUS_DERIVE_TIMEOUT).await
}

/// [`derive_status`] with an explicit ceiling.
pub async fn derive_status_within(
    root: Option<&Path>,
    scan: SpecScan,
    ceiling: Duration,
) -> ProjectStatus {
    let Some(root) = root else {
        return ProjectStatus::uninitialized("");
    };
    let label = root.display().to_string();

    match tokio::time::timeout(ceiling, derive(root, scan, label.clone())).await {
        Ok(status) => status,
        Err(_) => {
            tracing::warn!(
                root = %label,
                ceiling_ms = ceiling.as_millis() as u64,
                "status derivation timed out"
            );
            ProjectStatus::uninitialized(label)
        }
    }
}

async fn derive(root: &Path, scan: SpecScan, label: String) -> ProjectStatus {
    let [specify, templates, commands, memory] = paths::marker_dirs(root);
    let (a, b, c, d) = tokio::join!(
        is_dir(&specify),
        is_dir(&templates),
        is_dir(&commands),
        is_dir(&memory),
    );
    if !(a && b && c && d) {
        return ProjectStatus::uninitialized(label);
    }

    let constitution = paths::constitution_path(root);
    let specs_dir = paths::specs_dir(root);
    let (has_constitution, specs) = tokio::join!(
        constitution_filled(&constitution),
        scan_specs(&specs_dir, scan),
    );

    ProjectStatus {
        is_initialized: true,
        has_constitution,
        has_specification: specs.spec,
        has_plan: specs.plan,
        has_tasks: specs.tasks,
        workspace_root: label,
    }
}

// ---------------------------------------------------------------------------
// Sub-checks
// ---------------------------------------------------------------------------

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn constitution_filled(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(m) => m.is_file() && m.len() >= paths::CONSTITUTION_MIN_BYTES,
        Err(_) => false,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SpecFlags {
    spec: bool,
    plan: bool,
    tasks: bool,
}

impl SpecFlags {
    fn complete(self) -> bool {
        self.spec && self.plan && self.tasks
    }
}

async fn scan_specs(specs_dir: &Path, scan: SpecScan) -> SpecFlags {
    let mut dirs = feature_dirs(specs_dir).await;
    if scan == SpecScan::First {
        dirs.truncate(1);
    }

    let mut flags = SpecFlags::default();
    for dir in dirs {
        let [spec_md, plan_md, tasks_md] =
            [paths::SPEC_MD, paths::PLAN_MD, paths::TASKS_MD].map(|f| dir.join(f));
        let (spec, plan, tasks) =
            tokio::join!(is_file(&spec_md), is_file(&plan_md), is_file(&tasks_md));
        flags.spec |= spec;
        flags.plan |= plan;
        flags.tasks |= tasks;
        if flags.complete() {
            break;
        }
    }
    flags
}

/// Feature directories under `specs_dir`, sorted by name.
async fn feature_dirs(specs_dir: &Path) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(specs_dir).await {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    let mut dirs = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        if is_dir {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    dirs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
