use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use preview_core::{HeadlessRenderer, InMemoryStoryStore, PreviewEngine};
use shared::protocol::PreviewTrigger;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod config;

/// Replays a trigger script against a story catalog and prints every preview notification.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    catalog: PathBuf,
    #[arg(long)]
    script: PathBuf,
    #[arg(long, default_value = "preview.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(&args.config);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let store = Arc::new(InMemoryStoryStore::new());
    let registered = catalog::load_catalog(&args.catalog)?.register(&store);
    let raw_script = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read trigger script '{}'", args.script.display()))?;
    let script: Vec<PreviewTrigger> =
        serde_json::from_str(&raw_script).context("invalid trigger script")?;
    info!(stories = registered, triggers = script.len(), "starting preview replay");

    let engine = PreviewEngine::new_with_options(
        store,
        Arc::new(HeadlessRenderer),
        settings.preview_options(),
    );
    let mut events = engine.subscribe_events();
    let (triggers, rx) = broadcast::channel(script.len().max(1));
    let trigger_loop = engine.spawn_trigger_loop(rx);
    for trigger in script {
        triggers
            .send(trigger)
            .context("preview trigger loop stopped early")?;
    }
    drop(triggers);
    trigger_loop.await.context("preview trigger loop panicked")?;

    loop {
        match events.try_recv() {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "event buffer overflowed; raise event_capacity");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    let snapshot = engine.snapshot().await;
    println!(
        "screen={} surface={:?} layout={}",
        snapshot.screen.marker(),
        snapshot.active_surface,
        snapshot.layout.map_or("none", |class| class.css_class()),
    );
    Ok(())
}
