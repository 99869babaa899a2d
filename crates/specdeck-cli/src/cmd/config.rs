use crate::output::{print_json, print_table};
use clap::Subcommand;
use specdeck_core::config::{Settings, WarnLevel};
use specdeck_core::paths;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective settings (file values plus command-line overrides)
    Show,

    /// Validate the settings for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    root: &Path,
    settings: anyhow::Result<Settings>,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let settings = settings?;
    match subcmd {
        ConfigSubcommand::Show => show(root, &settings, json),
        ConfigSubcommand::Validate => validate(&settings, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, settings: &Settings, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(settings);
    }

    let file = paths::settings_path(root);
    let source = if file.exists() {
        file.display().to_string()
    } else {
        "(defaults)".to_string()
    };
    let executable = settings
        .executable_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(auto-detect)".to_string());
    let ignore = if settings.watch.ignore.is_empty() {
        "(none)".to_string()
    } else {
        settings.watch.ignore.join(", ")
    };

    print_table(
        &["SETTING", "VALUE"],
        vec![
            vec!["source".into(), source],
            vec!["executable_path".into(), executable],
            vec!["auto_detect".into(), settings.auto_detect.to_string()],
            vec![
                "command_timeout_secs".into(),
                settings.command_timeout_secs.to_string(),
            ],
            vec!["debug".into(), settings.debug.to_string()],
            vec!["spec_scan".into(), format!("{:?}", settings.spec_scan).to_lowercase()],
            vec![
                "watch.debounce_ms".into(),
                settings.watch.debounce_ms.to_string(),
            ],
            vec!["watch.ignore".into(), ignore],
        ],
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let warnings = settings.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
