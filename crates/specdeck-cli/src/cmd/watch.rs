use crate::cmd::runtime;
use anyhow::Context;
use specdeck_core::types::FileChangeEvent;
use specdeck_core::watcher::{ProjectWatcher, WatcherConfig};
use specdeck_core::SpecifyService;
use tokio::sync::broadcast::error::RecvError;

pub fn run(service: &SpecifyService, json: bool) -> anyhow::Result<()> {
    let rt = runtime()?;
    let service = service.clone();

    rt.block_on(async move {
        let config = WatcherConfig::from_settings(&service.settings().watch);
        let mut watcher =
            ProjectWatcher::new(service.workspace_root().map(|p| p.to_path_buf()), config);
        let mut batches = watcher.subscribe();
        let invalidator = service.invalidate_on(watcher.subscribe());

        watcher.start().context("failed to start file watcher")?;
        tracing::info!(state = %watcher.state(), "file watcher started");
        if !json {
            if let Some(root) = service.workspace_root() {
                println!("Watching {} (Ctrl+C to stop)", root.display());
            }
        }

        loop {
            tokio::select! {
                batch = batches.recv() => match batch {
                    Ok(batch) => print_batch(&service, &batch, json).await?,
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "dropped change batches");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        watcher.dispose();
        invalidator.abort();
        Ok::<(), anyhow::Error>(())
    })
}

async fn print_batch(
    service: &SpecifyService,
    batch: &[FileChangeEvent],
    json: bool,
) -> anyhow::Result<()> {
    let now = chrono::Local::now();

    if json {
        let line = serde_json::json!({
            "at": now.to_rfc3339(),
            "events": batch,
        });
        println!("{}", serde_json::to_string(&line)?);
        return Ok(());
    }

    let stamp = now.format("%H:%M:%S");
    for ev in batch {
        println!(
            "[{stamp}] {:<8} {} ({})",
            ev.kind.to_string(),
            ev.relative_path,
            ev.role
        );
    }
    let status = service.get_status(true).await;
    println!(
        "[{stamp}] status: initialized={} constitution={} spec={} plan={} tasks={}",
        status.is_initialized,
        status.has_constitution,
        status.has_specification,
        status.has_plan,
        status.has_tasks
    );
    Ok(())
}
