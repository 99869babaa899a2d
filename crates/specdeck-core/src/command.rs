//! The `specify` subcommands this crate knows how to run.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ScriptKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Sh,
    Ps,
}

impl ScriptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptKind::Sh => "sh",
            ScriptKind::Ps => "ps",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScriptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sh" => Ok(ScriptKind::Sh),
            "ps" => Ok(ScriptKind::Ps),
            other => Err(format!("unknown script kind '{other}': expected sh or ps")),
        }
    }
}

// ---------------------------------------------------------------------------
// InitOptions
// ---------------------------------------------------------------------------

/// Flags for `specify init`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitOptions {
    /// New project directory name. Ignored when `here` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Initialize in the current directory instead of creating one.
    #[serde(default)]
    pub here: bool,
    /// Assistant to scaffold commands for (`claude`, `copilot`, `gemini`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptKind>,
    #[serde(default)]
    pub no_git: bool,
    #[serde(default)]
    pub ignore_agent_tools: bool,
    /// Skip the confirmation when initializing into a non-empty directory.
    #[serde(default)]
    pub force: bool,
}

impl InitOptions {
    /// Initialize the open workspace in place.
    pub fn here() -> Self {
        Self {
            here: true,
            ..Default::default()
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["init".to_string()];
        if self.here {
            args.push("--here".to_string());
        } else if let Some(name) = &self.project_name {
            args.push(name.clone());
        }
        if let Some(ai) = &self.ai {
            args.push("--ai".to_string());
            args.push(ai.clone());
        }
        if let Some(script) = self.script {
            args.push("--script".to_string());
            args.push(script.as_str().to_string());
        }
        if self.no_git {
            args.push("--no-git".to_string());
        }
        if self.ignore_agent_tools {
            args.push("--ignore-agent-tools".to_string());
        }
        if self.force {
            args.push("--force".to_string());
        }
        args
    }
}

// ---------------------------------------------------------------------------
// SpecifyCommand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifyCommand {
    Init(InitOptions),
    Check,
    Version,
}

impl SpecifyCommand {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            SpecifyCommand::Init(opts) => opts.to_args(),
            SpecifyCommand::Check => vec!["check".to_string()],
            SpecifyCommand::Version => vec!["version".to_string()],
        }
    }

    /// Whether a successful run may have changed files under the workspace.
    pub fn mutates_workspace(&self) -> bool {
        matches!(self, SpecifyCommand::Init(_))
    }
}

impl fmt::Display for SpecifyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "specify {}", self.to_args().join(" "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
