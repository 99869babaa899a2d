use crate::cmd::{runtime, yes_no};
use crate::output::{print_json, print_table};
use specdeck_core::SpecifyService;

pub fn run(service: &SpecifyService, refresh: bool, json: bool) -> anyhow::Result<()> {
    let rt = runtime()?;
    let status = rt.block_on(service.get_status(refresh));

    if json {
        return print_json(&status);
    }

    println!("Workspace: {}", status.workspace_root);
    if !status.is_initialized {
        println!("Not initialized. Run `specdeck init --here` to set up spec-kit.");
        return Ok(());
    }
    print_table(
        &["ARTIFACT", "PRESENT"],
        vec![
            vec!["initialized".to_string(), yes_no(status.is_initialized)],
            vec!["constitution".to_string(), yes_no(status.has_constitution)],
            vec!["specification".to_string(), yes_no(status.has_specification)],
            vec!["plan".to_string(), yes_no(status.has_plan)],
            vec!["tasks".to_string(), yes_no(status.has_tasks)],
        ],
    );
    Ok(())
}
