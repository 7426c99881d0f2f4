//! skygauged — the skygauge metrics daemon.
//!
//! Gathers subnet capacity and node pool rollout policy gauges from a
//! static inventory and serves them in the Prometheus text format.
//!
//! # Usage
//!
//! ```text
//! skygauged --config /etc/skygauge/skygauge.toml serve
//! skygauged --config skygauge.toml collect
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use skygauge_collector::StaticInventory;
use skygauge_core::SkygaugeConfig;
use skygauged::{ExpositionState, build_collectors, build_router, run_cache_janitor};

const DEFAULT_LOG_FILTER: &str = "info,skygauged=debug,skygauge=debug";

#[derive(Parser)]
#[command(name = "skygauged", about = "skygauge metrics daemon")]
struct Cli {
    /// Path to skygauge.toml.
    #[arg(long, global = true, default_value = "skygauge.toml")]
    config: PathBuf,

    /// Override `installation.name`.
    #[arg(long, global = true)]
    installation: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve /metrics and /healthz until interrupted.
    Serve {
        /// Override `exposition.listen`.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Gather once and print the exposition text to stdout.
    Collect,
    /// Print every metric family the enabled collectors expose.
    Describe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = SkygaugeConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(name) = cli.installation {
        config.installation.name = name;
    }
    if let Command::Serve {
        listen: Some(listen),
    } = &cli.command
    {
        config.exposition.listen = listen.clone();
    }
    config.validate()?;

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::Collect => collect_once(config).await,
        Command::Describe => describe(config),
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_inventory(config: &SkygaugeConfig) -> anyhow::Result<StaticInventory> {
    let path = &config.inventory.path;
    let inventory = StaticInventory::from_file(path)
        .with_context(|| format!("loading inventory {}", path.display()))?;
    info!(
        path = %path.display(),
        accounts = inventory.inventory().accounts.len(),
        node_pools = inventory.inventory().node_pools.len(),
        "inventory loaded"
    );
    Ok(inventory)
}

async fn serve(config: SkygaugeConfig) -> anyhow::Result<()> {
    let collectors = build_collectors(&config, load_inventory(&config)?)?;
    let addr = config.listen_addr()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Expired snapshots are only dropped on lookup otherwise.
    let janitor_interval = config.subnet_cache_ttl()?;
    let janitor = collectors.subnet.clone().map(|subnet| {
        tokio::spawn(run_cache_janitor(subnet, janitor_interval, shutdown_rx.clone()))
    });

    let router = build_router(ExpositionState {
        registry: Arc::new(collectors.registry),
        scrape_timeout: config.scrape_timeout()?,
    });

    info!(%addr, "exposition server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let mut server_shutdown = shutdown_rx.clone();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = server_shutdown.changed().await;
    });

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    if let Some(handle) = janitor {
        let _ = handle.await;
    }

    info!("skygauged stopped");
    Ok(())
}

async fn collect_once(config: SkygaugeConfig) -> anyhow::Result<()> {
    let collectors = build_collectors(&config, load_inventory(&config)?)?;
    let (text, gathered) = collectors.registry.render().await?;
    print!("{text}");

    if !gathered.is_success() {
        eprint!("{}", gathered.failure_report());
        anyhow::bail!("{} collector(s) failed", gathered.failures.len());
    }
    Ok(())
}

fn describe(config: SkygaugeConfig) -> anyhow::Result<()> {
    let collectors = build_collectors(&config, load_inventory(&config)?)?;
    for desc in collectors.registry.describe() {
        println!("{}\t{}\t{}", desc.fq_name(), desc.labels().join(","), desc.help());
    }
    Ok(())
}
