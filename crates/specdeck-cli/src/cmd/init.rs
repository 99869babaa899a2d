use crate::cmd::{run::report, runtime};
use clap::Args;
use specdeck_core::command::{InitOptions, ScriptKind};
use specdeck_core::SpecifyService;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name of the new project directory
    name: Option<String>,

    /// Initialize in the workspace root instead of a new directory
    #[arg(long, conflicts_with = "name")]
    here: bool,

    /// AI assistant to scaffold commands for (claude, copilot, gemini, ...)
    #[arg(long)]
    ai: Option<String>,

    /// Script flavour: sh or ps
    #[arg(long, value_name = "KIND")]
    script: Option<ScriptKind>,

    /// Skip git repository initialization
    #[arg(long)]
    no_git: bool,

    /// Skip checks for AI agent tools
    #[arg(long)]
    ignore_agent_tools: bool,

    /// Merge into a non-empty directory without confirmation
    #[arg(long)]
    force: bool,
}

impl InitArgs {
    fn into_options(self) -> anyhow::Result<InitOptions> {
        if self.name.is_none() && !self.here {
            anyhow::bail!("provide a project NAME or pass --here");
        }
        Ok(InitOptions {
            project_name: self.name,
            here: self.here,
            ai: self.ai,
            script: self.script,
            no_git: self.no_git,
            ignore_agent_tools: self.ignore_agent_tools,
            force: self.force,
        })
    }
}

pub fn run(service: &SpecifyService, args: InitArgs, json: bool) -> anyhow::Result<()> {
    let opts = args.into_options()?;
    let rt = runtime()?;
    let result = rt.block_on(service.run_init(opts));
    report(&result, json)
}
