use crate::error::{Result, SpecdeckError};
use crate::glob;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SpecScan
// ---------------------------------------------------------------------------

/// How many feature directories under `.specify/specs` feed the
/// spec/plan/tasks flags of a project status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecScan {
    /// Only the first directory in name order. Bounded cost.
    #[default]
    First,
    /// A flag is set when any feature directory has the file.
    All,
}

// ---------------------------------------------------------------------------
// WatchSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Extra glob patterns appended to the built-in ignore list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore: Vec::new(),
        }
    }
}

impl WatchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Explicit path to the `specify` executable. Tried before any search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<PathBuf>,
    /// When false only `executable_path` is considered.
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,
    #[serde(default = "default_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub spec_scan: SpecScan,
    #[serde(default)]
    pub watch: WatchSettings,
}

fn default_auto_detect() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            executable_path: None,
            auto_detect: default_auto_detect(),
            command_timeout_secs: default_timeout_secs(),
            debug: false,
            spec_scan: SpecScan::default(),
            watch: WatchSettings::default(),
        }
    }
}

impl Settings {
    /// Load `<root>/.specdeck.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::settings_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&data).map_err(|e| SpecdeckError::InvalidConfig {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.command_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "command_timeout_secs is 0: every command would time out immediately"
                    .to_string(),
            });
        }

        if let Some(path) = &self.executable_path {
            if !path.exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "executable_path '{}' does not exist; auto-detection will be used",
                        path.display()
                    ),
                });
            }
        } else if !self.auto_detect {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auto_detect is off and no executable_path is set: specify can never be found"
                    .to_string(),
            });
        }

        if self.watch.debounce_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "watch.debounce_ms is 0: change bursts will not be coalesced".to_string(),
            });
        }

        for pattern in &self.watch.ignore {
            if let Err(e) = glob::compile(pattern) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("watch.ignore entry skipped: {e}"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
