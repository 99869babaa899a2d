pub mod config;
pub mod detect;
pub mod init;
pub mod run;
pub mod status;
pub mod watch;

use anyhow::Context;
use specdeck_core::config::Settings;
use std::path::{Path, PathBuf};

/// Command-line values that take precedence over `.specdeck.yaml`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub specify_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub debug: bool,
}

pub fn load_settings(root: &Path, overrides: &Overrides) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(root).context("failed to load settings")?;
    if let Some(path) = &overrides.specify_path {
        settings.executable_path = Some(path.clone());
    }
    if let Some(secs) = overrides.timeout_secs {
        settings.command_timeout_secs = secs;
    }
    if overrides.debug {
        settings.debug = true;
    }
    Ok(settings)
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start tokio runtime")
}

pub fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}
