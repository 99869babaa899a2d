mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, init::InitArgs, Overrides};
use specdeck_core::command::SpecifyCommand;
use specdeck_core::config::Settings;
use specdeck_core::SpecifyService;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "specdeck",
    about = "Detect and drive the spec-kit `specify` CLI, and track project status",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .specify/ or .git/)
    #[arg(long, global = true, env = "SPECDECK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Path to the specify executable (overrides executable_path)
    #[arg(long, global = true, env = "SPECIFY_PATH")]
    specify_path: Option<PathBuf>,

    /// Command timeout in seconds (overrides command_timeout_secs)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log full error detail
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the specify executable
    Detect {
        /// Ignore the cached result
        #[arg(long)]
        refresh: bool,
    },

    /// Run `specify init`
    Init(InitArgs),

    /// Run `specify check`
    Check,

    /// Run `specify version`
    Version,

    /// Show which project artifacts exist
    Status {
        /// Ignore the cached result
        #[arg(long)]
        refresh: bool,
    },

    /// Watch project files and print change batches until Ctrl+C
    Watch,

    /// Inspect and validate .specdeck.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let root = root::resolve_root(cli.root.as_deref());
    let overrides = Overrides {
        specify_path: cli.specify_path.clone(),
        timeout_secs: cli.timeout,
        debug: cli.debug,
    };
    let settings = cmd::load_settings(&root, &overrides);

    let debug = cli.debug || settings.as_ref().map(|s| s.debug).unwrap_or(false);
    let default_level = if debug {
        tracing::Level::DEBUG
    } else {
        match &cli.command {
            Commands::Watch => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let result = match cli.command {
        Commands::Config { subcommand } => cmd::config::run(&root, settings, subcommand, json),
        Commands::Detect { refresh } => {
            with_service(&root, settings, |svc| cmd::detect::run(svc, refresh, json))
        }
        Commands::Init(args) => with_service(&root, settings, |svc| cmd::init::run(svc, args, json)),
        Commands::Check => with_service(&root, settings, |svc| {
            cmd::run::run(svc, SpecifyCommand::Check, json)
        }),
        Commands::Version => with_service(&root, settings, |svc| {
            cmd::run::run(svc, SpecifyCommand::Version, json)
        }),
        Commands::Status { refresh } => {
            with_service(&root, settings, |svc| cmd::status::run(svc, refresh, json))
        }
        Commands::Watch => with_service(&root, settings, |svc| cmd::watch::run(svc, json)),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn with_service(
    root: &Path,
    settings: anyhow::Result<Settings>,
    f: impl FnOnce(&SpecifyService) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let service = SpecifyService::new(settings?, Some(root.to_path_buf()));
    f(&service)
}
