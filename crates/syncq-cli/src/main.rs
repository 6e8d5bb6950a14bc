mod storefront;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use syncq_core::{
    CompletedTask, LogKind, Priority, ProcessorBuilder, ProcessorConfig, SyncProcessor,
};

use crate::storefront::{AddToCart, EditTeamMember, SharedStore, StockChange, Storefront};

const SKUS: [&str; 4] = ["laptop", "mouse", "keyboard", "monitor"];

/// Storefront demo driving the sync queue: cart additions, team edits and a
/// periodic stock simulator all go through one sequential processor.
///
/// Example:
///   syncq-cli --latency-ms 200 --stock-interval-ms 700 --run-for-ms 3000
#[derive(Debug, Parser)]
#[command(name = "syncq-cli", about = "Priority sync queue demo", long_about = None)]
struct Cli {
    /// YAML file with `latency_ms`, `log_capacity` and `default_priority`.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Overrides `latency_ms` from the config file.
    #[arg(short = 'l', long = "latency-ms")]
    latency_ms: Option<u64>,

    /// Overrides `log_capacity` from the config file.
    #[arg(long = "log-capacity")]
    log_capacity: Option<usize>,

    /// Period of the simulated stock updates.
    #[arg(short = 's', long = "stock-interval-ms", default_value_t = 1000)]
    stock_interval_ms: u64,

    /// How long producers run before shutdown.
    #[arg(short = 'r', long = "run-for-ms", default_value_t = 3000)]
    run_for_ms: u64,
}

fn load_config(path: &Path) -> Result<ProcessorConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
}

fn resolve_config(cli: &Cli) -> Result<ProcessorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading processor configuration from: {}", path.display());
            load_config(path)?
        }
        None => ProcessorConfig::default(),
    };
    if let Some(ms) = cli.latency_ms {
        config.latency = Duration::from_millis(ms);
    }
    if let Some(capacity) = cli.log_capacity {
        config.log_capacity = capacity;
    }
    Ok(config)
}

async fn enqueue_user_actions(processor: &SyncProcessor, store: &SharedStore) {
    for sku in ["laptop", "mouse", "laptop"] {
        processor
            .enqueue(Box::new(AddToCart::new(Arc::clone(store), sku)), Priority::NORMAL)
            .await;
    }
    for (name, role) in [("ana", "lead"), ("luis", "designer")] {
        processor
            .enqueue(
                Box::new(EditTeamMember::new(Arc::clone(store), name, role)),
                Priority::HIGH,
            )
            .await;
    }
    // the first mouse add takes the only unit; unless a stock tick restocks it first,
    // this one fails and is skipped
    processor
        .enqueue(Box::new(AddToCart::new(Arc::clone(store), "mouse")), Priority::NORMAL)
        .await;
}

#[tokio::main]
async fn main() -> Result<()> {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    info!(
        latency_ms = config.latency.as_millis() as u64,
        log_capacity = config.log_capacity,
        default_priority = %config.default_priority,
        "Configuration"
    );

    let processor = ProcessorBuilder::new()
        .with_config(config)
        .observer(|task: &CompletedTask| {
            info!(task_id = %task.id(), priority = %task.meta.priority, "completed {}", task.label());
        })
        .build()?;

    let mut status_rx = processor.status_receiver();
    let status_watcher = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = *status_rx.borrow_and_update();
            info!(%status, "sync indicator");
        }
    });

    let store = Storefront::with_stock(&[("laptop", 5), ("mouse", 1), ("keyboard", 3)]);

    let mut tick = 0usize;
    processor
        .spawn_producer(Duration::from_millis(cli.stock_interval_ms), {
            let store = Arc::clone(&store);
            move || {
                let sku = SKUS[tick % SKUS.len()];
                let delta = if tick % 3 == 0 { -1 } else { 2 };
                tick += 1;
                let op: Box<dyn syncq_core::Operation> =
                    Box::new(StockChange::new(Arc::clone(&store), sku, delta));
                Some((op, Priority::LOW))
            }
        })
        .await?;

    enqueue_user_actions(&processor, &store).await;
    processor
        .log_event(LogKind::Info, "user actions submitted")
        .await;

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(cli.run_for_ms)) => {}
        _ = tokio::signal::ctrl_c() => warn!("interrupted, shutting down early"),
    }

    processor.shutdown().await;
    processor.wait_until_synced().await;
    status_watcher.abort();

    let snapshot = processor.snapshot().await;
    info!(
        synced = !snapshot.status.is_syncing(),
        queued = snapshot.queued(),
        sync_count = snapshot.sync_count,
        executed = snapshot.executed,
        failed = snapshot.failed,
        "Processor drained"
    );
    for entry in processor.log_entries().await {
        println!(
            "{}  [{:<7}] {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.kind,
            entry.message
        );
    }

    let store = store.lock().await;
    println!("{}", serde_json::to_string_pretty(&*store)?);
    Ok(())
}
