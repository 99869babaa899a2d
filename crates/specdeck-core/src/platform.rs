//! Where `specify` usually lives, per operating system.
//!
//! `specify` is distributed as a Python tool, so the usual homes are the
//! directories `uv tool`, `pipx` and `pip --user` install into, followed by
//! package-manager prefixes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the executable, with the platform suffix.
pub fn executable_name(binary: &str) -> String {
    if cfg!(windows) {
        format!("{binary}.exe")
    } else {
        binary.to_string()
    }
}

/// Install directories in the order they are tried.
///
/// Unix: `~/.local/bin` (uv, pipx), `~/.cargo/bin`, `/opt/homebrew/bin`,
/// `/usr/local/bin`, `/home/linuxbrew/.linuxbrew/bin`, `/usr/bin`.
///
/// Windows: `%USERPROFILE%\.local\bin` (uv), `%APPDATA%\Python\Scripts`
/// (pip --user), `%LOCALAPPDATA%\Programs\Python\Scripts`,
/// `%USERPROFILE%\scoop\shims`.
pub fn search_dirs() -> Vec<PathBuf> {
    search_dirs_for(home::home_dir().as_deref())
}

#[cfg(not(windows))]
fn search_dirs_for(home: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = home {
        dirs.push(home.join(".local").join("bin"));
        dirs.push(home.join(".cargo").join("bin"));
    }
    for fixed in [
        "/opt/homebrew/bin",
        "/usr/local/bin",
        "/home/linuxbrew/.linuxbrew/bin",
        "/usr/bin",
    ] {
        dirs.push(PathBuf::from(fixed));
    }
    dirs
}

#[cfg(windows)]
fn search_dirs_for(home: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = home {
        dirs.push(home.join(".local").join("bin"));
    }
    if let Some(appdata) = std::env::var_os("APPDATA") {
        dirs.push(PathBuf::from(appdata).join("Python").join("Scripts"));
    }
    if let Some(local) = std::env::var_os("LOCALAPPDATA") {
        dirs.push(
            PathBuf::from(local)
                .join("Programs")
                .join("Python")
                .join("Scripts"),
        );
    }
    if let Some(home) = home {
        dirs.push(home.join("scoop").join("shims"));
    }
    dirs
}

/// Candidate executable paths for `binary`, in priority order.
pub fn candidate_paths(binary: &str) -> Vec<PathBuf> {
    let name = executable_name(binary);
    search_dirs().into_iter().map(|d| d.join(&name)).collect()
}

/// `current` with every directory in `extra` appended that is not already
/// present. Existing entries keep their order and precedence.
pub fn augment_path(current: Option<OsString>, extra: &[PathBuf]) -> Option<OsString> {
    let mut entries: Vec<PathBuf> = current
        .as_deref()
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();
    for dir in extra {
        if !entries.iter().any(|e| e == dir) {
            entries.push(dir.clone());
        }
    }
    std::env::join_paths(entries).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_dirs_come_before_system_dirs() {
        let dirs = search_dirs_for(Some(Path::new("/home/me")));
        assert_eq!(dirs[0], Path::new("/home/me").join(".local").join("bin"));
        assert!(dirs.len() > 1);
    }

    #[test]
    fn no_home_still_yields_dirs() {
        let dirs = search_dirs_for(None);
        assert!(dirs.iter().all(|d| !d.starts_with("/home/me")));
    }

    #[test]
    fn candidates_end_with_executable_name() {
        for c in candidate_paths("specify") {
            assert_eq!(
                c.file_name().unwrap().to_string_lossy(),
                executable_name("specify")
            );
        }
    }

    #[test]
    fn augment_appends_missing_dirs_once() {
        let a = PathBuf::from("/opt/a");
        let b = PathBuf::from("/opt/b");
        let current = std::env::join_paths([&a]).unwrap();
        let out = augment_path(Some(current), &[a.clone(), b.clone(), b.clone()]).unwrap();
        let parts: Vec<PathBuf> = std::env::split_paths(&out).collect();
        assert_eq!(parts, vec![a, b]);
    }

    #[test]
    fn augment_without_existing_path() {
        let b = PathBuf::from("/opt/b");
        let out = augment_path(None, &[b.clone()]).unwrap();
        assert_eq!(std::env::split_paths(&out).collect::<Vec<_>>(), vec![b]);
    }
}
