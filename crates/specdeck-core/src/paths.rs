use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SPECIFY_DIR: &str = ".specify";
pub const TEMPLATES_DIR: &str = ".specify/templates";
pub const COMMANDS_DIR: &str = ".specify/templates/commands";
pub const MEMORY_DIR: &str = ".specify/memory";
pub const SPECS_DIR: &str = ".specify/specs";

pub const CONSTITUTION_FILE: &str = ".specify/memory/constitution.md";

pub const SPEC_MD: &str = "spec.md";
pub const PLAN_MD: &str = "plan.md";
pub const TASKS_MD: &str = "tasks.md";

/// Workspace-level settings file read by [`crate::config::Settings::load`].
pub const SETTINGS_FILE: &str = ".specdeck.yaml";

/// A constitution smaller than this is still the unfilled template.
pub const CONSTITUTION_MIN_BYTES: u64 = 100;

/// Command directories written by `specify init --ai <assistant>`, relative
/// to the workspace root.
pub const AGENT_COMMAND_DIRS: &[&str] = &[
    ".claude/commands",
    ".github/prompts",
    ".gemini/commands",
    ".cursor/commands",
    ".qwen/commands",
    ".opencode/command",
    ".windsurf/workflows",
    ".codex/prompts",
    ".kilocode/workflows",
    ".augment/commands",
    ".roo/commands",
    ".amazonq/prompts",
];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn specify_dir(root: &Path) -> PathBuf {
    root.join(SPECIFY_DIR)
}

pub fn templates_dir(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

pub fn commands_dir(root: &Path) -> PathBuf {
    root.join(COMMANDS_DIR)
}

pub fn memory_dir(root: &Path) -> PathBuf {
    root.join(MEMORY_DIR)
}

pub fn specs_dir(root: &Path) -> PathBuf {
    root.join(SPECS_DIR)
}

pub fn constitution_path(root: &Path) -> PathBuf {
    root.join(CONSTITUTION_FILE)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

/// The four directories whose joint presence marks an initialized project.
pub fn marker_dirs(root: &Path) -> [PathBuf; 4] {
    [
        specify_dir(root),
        templates_dir(root),
        commands_dir(root),
        memory_dir(root),
    ]
}

/// Render `path` relative to `root` with forward slashes.
///
/// Returns `None` when `path` is outside `root`.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_dirs_are_under_root() {
        let root = Path::new("/work");
        let markers = marker_dirs(root);
        assert_eq!(markers[0], Path::new("/work/.specify"));
        assert_eq!(markers[2], Path::new("/work/.specify/templates/commands"));
        assert!(markers.iter().all(|m| m.starts_with(root)));
    }

    #[test]
    fn relative_to_uses_forward_slashes() {
        let root = Path::new("/work");
        let path = root.join(".specify").join("memory").join("constitution.md");
        assert_eq!(
            relative_to(root, &path).as_deref(),
            Some(CONSTITUTION_FILE)
        );
    }

    #[test]
    fn relative_to_rejects_outside_paths() {
        assert!(relative_to(Path::new("/work"), Path::new("/elsewhere/a.md")).is_none());
    }

    #[test]
    fn relative_to_root_itself_is_empty() {
        assert_eq!(relative_to(Path::new("/work"), Path::new("/work")).as_deref(), Some(""));
    }
}
