//! Resolve a runnable `specify` executable.
//!
//! Resolution order, first success wins:
//! 1. the configured custom path, if it exists
//! 2. [`platform::candidate_paths`] in their documented order
//! 3. a `PATH` lookup by name
//!
//! Every candidate must pass a liveness probe (`--help`, bounded by a short
//! timeout) before it is reported as found. A file that exists but cannot run
//! is skipped, not returned.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::platform;
use crate::runner::{self, RunOptions};
use crate::sanitize::{parse_version, sanitize};
use crate::types::DetectionResult;

pub const DEFAULT_BINARY: &str = "specify";

/// Per-candidate bound on each probe process.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub const INSTALL_HINT: &str =
    "install it with `uv tool install specify-cli --from git+https://github.com/github/spec-kit.git` \
     or set executable_path in .specdeck.yaml";

#[derive(Debug, Clone)]
pub struct Locator {
    binary: String,
    candidates: Vec<PathBuf>,
    search_path: Option<OsString>,
    probe_timeout: Duration,
    auto_detect: bool,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl Locator {
    pub fn new(binary: impl Into<String>) -> Self {
        let binary = binary.into();
        Self {
            candidates: platform::candidate_paths(&binary),
            binary,
            search_path: None,
            probe_timeout: PROBE_TIMEOUT,
            auto_detect: true,
        }
    }

    /// Replace the platform install-directory candidates.
    pub fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Search this `PATH`-style list instead of the process `PATH`.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// When off, only the custom path hint is considered.
    pub fn with_auto_detect(mut self, auto_detect: bool) -> Self {
        self.auto_detect = auto_detect;
        self
    }

    pub async fn locate(&self, custom: Option<&Path>) -> DetectionResult {
        let mut tried: Vec<String> = Vec::new();
        let mut probed: Vec<PathBuf> = Vec::new();

        if let Some(custom) = custom {
            if custom.exists() {
                probed.push(custom.to_path_buf());
                if let Some(found) = self.probe(custom).await {
                    return found;
                }
                tried.push(format!("{} (configured, not runnable)", custom.display()));
            } else {
                tried.push(format!("{} (configured, does not exist)", custom.display()));
            }
        }

        if !self.auto_detect {
            tracing::debug!("auto-detect disabled; skipping install-dir and PATH search");
            return DetectionResult::not_found(not_found_message(&self.binary, &tried));
        }

        for candidate in &self.candidates {
            if !candidate.is_file() || probed.contains(candidate) {
                continue;
            }
            probed.push(candidate.clone());
            if let Some(found) = self.probe(candidate).await {
                return found;
            }
            tried.push(format!("{} (not runnable)", candidate.display()));
        }

        match self.which() {
            Ok(path) if probed.contains(&path) => {}
            Ok(path) => {
                if let Some(found) = self.probe(&path).await {
                    return found;
                }
                tried.push(format!("{} (on PATH, not runnable)", path.display()));
            }
            Err(e) => {
                tracing::debug!(binary = %self.binary, error = %e, "PATH lookup failed");
                tried.push(format!("{} not on PATH", self.binary));
            }
        }

        DetectionResult::not_found(not_found_message(&self.binary, &tried))
    }

    /// Liveness check, then a best-effort version query.
    async fn probe(&self, path: &Path) -> Option<DetectionResult> {
        let opts = RunOptions {
            timeout: self.probe_timeout,
            ..Default::default()
        };

        let help = runner::run(path, &["--help".to_string()], &opts).await;
        if !help.success {
            tracing::debug!(
                path = %path.display(),
                error = help.error.as_deref().unwrap_or(""),
                "candidate failed liveness probe"
            );
            return None;
        }

        let version = runner::run(path, &["version".to_string()], &opts).await;
        let version = if version.success {
            parse_version(&sanitize(&version.output))
        } else {
            None
        };

        tracing::info!(path = %path.display(), version = ?version, "found specify");
        Some(DetectionResult::found(path.to_path_buf(), version))
    }

    fn which(&self) -> which::Result<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(&self.binary, Some(paths), cwd)
            }
            None => which::which(&self.binary),
        }
    }
}

fn not_found_message(binary: &str, tried: &[String]) -> String {
    let mut msg = format!("{binary} CLI not found: {INSTALL_HINT}");
    if !tried.is_empty() {
        msg.push_str(". Tried: ");
        msg.push_str(&tried.join("; "));
    }
    msg
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_lists_attempts() {
        let msg = not_found_message("specify", &["a (x)".into(), "b (y)".into()]);
        assert!(msg.starts_with("specify CLI not found"));
        assert!(msg.contains("uv tool install"));
        assert!(msg.ends_with("Tried: a (x); b (y)"));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        const WORKING: &str = r#"case "$1" in
  --help) echo "Usage: specify [OPTIONS] COMMAND"; exit 0 ;;
  version) echo "specify-cli 1.2.3"; exit 0 ;;
esac
exit 0"#;

        const BROKEN: &str = "echo 'ModuleNotFoundError: specify_cli' >&2; exit 1";

        fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
            std::fs::create_dir_all(dir).unwrap();
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        fn isolated(search: &Path) -> Locator {
            Locator::new("specify")
                .with_candidates(vec![])
                .with_search_path(search.as_os_str().to_owned())
        }

        #[tokio::test]
        async fn working_custom_path_is_found_with_version() {
            let dir = TempDir::new().unwrap();
            let exe = script(&dir.path().join("custom"), "specify", WORKING);
            let empty = dir.path().join("empty");
            std::fs::create_dir_all(&empty).unwrap();

            let result = isolated(&empty).locate(Some(&exe)).await;
            assert!(result.found, "{result:?}");
            assert_eq!(result.path.as_deref(), Some(exe.as_path()));
            assert_eq!(result.version.as_deref(), Some("1.2.3"));
            assert_eq!(result.error, None);
        }

        #[tokio::test]
        async fn broken_custom_path_falls_through_to_path_lookup() {
            let dir = TempDir::new().unwrap();
            let broken = script(&dir.path().join("custom"), "specify", BROKEN);
            let bin = dir.path().join("bin");
            let on_path = script(&bin, "specify", WORKING);

            let result = isolated(&bin).locate(Some(&broken)).await;
            assert!(result.found, "{result:?}");
            assert_eq!(result.path.as_deref(), Some(on_path.as_path()));
        }

        #[tokio::test]
        async fn non_executable_custom_file_is_not_found() {
            let dir = TempDir::new().unwrap();
            let custom = dir.path().join("specify");
            std::fs::write(&custom, "not a program").unwrap();
            let empty = dir.path().join("empty");
            std::fs::create_dir_all(&empty).unwrap();

            let result = isolated(&empty).locate(Some(&custom)).await;
            assert!(!result.found);
            assert_eq!(result.path, None);
            let err = result.error.unwrap();
            assert!(err.contains("configured, not runnable"), "{err}");
            assert!(err.contains("not on PATH"), "{err}");
        }

        #[tokio::test]
        async fn install_dir_candidate_beats_path() {
            let dir = TempDir::new().unwrap();
            let installed = script(&dir.path().join("local-bin"), "specify", WORKING);
            let bin = dir.path().join("bin");
            script(&bin, "specify", WORKING);

            let locator = isolated(&bin).with_candidates(vec![
                dir.path().join("missing").join("specify"),
                installed.clone(),
            ]);
            let result = locator.locate(None).await;
            assert_eq!(result.path.as_deref(), Some(installed.as_path()));
        }

        #[tokio::test]
        async fn broken_candidate_is_skipped() {
            let dir = TempDir::new().unwrap();
            let stale = script(&dir.path().join("stale"), "specify", BROKEN);
            let bin = dir.path().join("bin");
            let on_path = script(&bin, "specify", WORKING);

            let result = isolated(&bin).with_candidates(vec![stale]).locate(None).await;
            assert_eq!(result.path.as_deref(), Some(on_path.as_path()));
        }

        #[tokio::test]
        async fn auto_detect_off_ignores_path() {
            let dir = TempDir::new().unwrap();
            let bin = dir.path().join("bin");
            script(&bin, "specify", WORKING);

            let result = isolated(&bin).with_auto_detect(false).locate(None).await;
            assert!(!result.found);
        }

        #[tokio::test]
        async fn version_is_optional() {
            let dir = TempDir::new().unwrap();
            let bin = dir.path().join("bin");
            script(&bin, "specify", "[ \"$1\" = version ] && exit 2; exit 0");

            let result = isolated(&bin).locate(None).await;
            assert!(result.found);
            assert_eq!(result.version, None);
        }

        #[tokio::test]
        async fn hung_candidate_is_bounded_by_probe_timeout() {
            let dir = TempDir::new().unwrap();
            let hung = script(&dir.path().join("hung"), "specify", "sleep 10");
            let empty = dir.path().join("empty");
            std::fs::create_dir_all(&empty).unwrap();

            let started = std::time::Instant::now();
            let result = isolated(&empty)
                .with_probe_timeout(Duration::from_millis(200))
                .locate(Some(&hung))
                .await;
            assert!(!result.found);
            assert!(started.elapsed() < Duration::from_secs(3));
        }
    }
}
