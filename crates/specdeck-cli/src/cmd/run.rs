use crate::cmd::runtime;
use crate::output::print_json;
use specdeck_core::command::SpecifyCommand;
use specdeck_core::types::CommandResult;
use specdeck_core::SpecifyService;

/// Run one `specify` subcommand and report its result.
pub fn run(service: &SpecifyService, command: SpecifyCommand, json: bool) -> anyhow::Result<()> {
    let rt = runtime()?;
    let result = rt.block_on(service.run_command(command));
    report(&result, json)
}

/// Print a command result; a failed result becomes the returned error.
pub fn report(result: &CommandResult, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(result)?;
    } else if !result.output.is_empty() {
        println!("{}", result.output);
    }

    if !result.success {
        let message = result
            .error
            .clone()
            .unwrap_or_else(|| "command failed".to_string());
        anyhow::bail!(message);
    }
    Ok(())
}
