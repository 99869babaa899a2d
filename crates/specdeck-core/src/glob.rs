//! The watcher's ignore list, matched against forward-slash relative paths.

use crate::error::{Result, SpecdeckError};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

/// Directories whose churn never affects project status.
pub const DEFAULT_IGNORES: &[&str] = &[
    "**/.git/**",
    "**/node_modules/**",
    "**/target/**",
    "**/dist/**",
    "**/build/**",
    "**/out/**",
    "**/.venv/**",
    "**/__pycache__/**",
    "**/*.swp",
    "**/.DS_Store",
];

/// Compile one pattern. `*` and `?` never cross a `/`; only `**` does.
pub fn compile(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| SpecdeckError::InvalidGlob {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })
}

#[derive(Debug, Clone)]
pub struct IgnoreList {
    set: GlobSet,
}

impl IgnoreList {
    /// The built-in ignore list plus `extra`. Unparseable extras are skipped
    /// with a warning so one bad entry does not disable the watcher.
    pub fn new(extra: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pat in DEFAULT_IGNORES.iter().copied().chain(extra.iter().map(String::as_str)) {
            if pat.trim().is_empty() {
                continue;
            }
            match compile(pat) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::warn!(error = %e, "skipping ignore pattern"),
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignore list failed to build; nothing is ignored");
            GlobSet::empty()
        });
        Self { set }
    }

    pub fn is_match(&self, relative_path: &str) -> bool {
        self.set.is_match(relative_path)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(&[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
