use crate::cmd::runtime;
use crate::output::{print_json, print_table};
use specdeck_core::SpecifyService;

pub fn run(service: &SpecifyService, refresh: bool, json: bool) -> anyhow::Result<()> {
    let rt = runtime()?;
    let result = rt.block_on(service.detect(refresh));

    if json {
        print_json(&result)?;
    } else if result.found {
        let path = result
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let version = result.version.clone().unwrap_or_else(|| "unknown".to_string());
        print_table(
            &["FIELD", "VALUE"],
            vec![
                vec!["path".to_string(), path],
                vec!["version".to_string(), version],
            ],
        );
    }

    if !result.found {
        anyhow::bail!(
            "{}",
            result
                .error
                .unwrap_or_else(|| "specify executable not found".to_string())
        );
    }
    Ok(())
}
