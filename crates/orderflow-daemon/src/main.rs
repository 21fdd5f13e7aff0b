#![deny(unsafe_code)]
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use orderflow_daemon::{
    build_app, spawn_worker_pool, AppState, DefaultExtractionJobHandler, ExtractionPipelineConfig, TenantJobQueue, WorkerPoolConfig,
};
use orderflow_mock::{MockLlmProvider, MockObjectStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orderflow-daemon", version, about = "OrderFlow extraction worker pool and operator API")]
struct Args {
    /// Bind address for the operator HTTP API.
    #[arg(long, default_value = "127.0.0.1:8089")]
    bind: String,

    /// Path to the OrderFlow TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of concurrent extraction worker tasks.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Maximum queued extraction jobs per tenant before intake sees backpressure.
    #[arg(long, default_value_t = 100)]
    max_per_tenant_queue: usize,

    /// Enable debug-level tracing.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug { EnvFilter::new("orderflow=debug") } else { EnvFilter::new("orderflow=info") };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = orderflow_config::load_config(args.config.as_deref()).context("load configuration")?;
    let log_level = config.log_level.as_deref().unwrap_or("info");
    info!(log_level, tenants = config.tenants.len(), "configuration loaded");

    // Wired with in-memory mock providers by default so the daemon is
    // runnable out of the box. A real deployment replaces these two
    // trait objects with adapters for its actual LLM and object storage.
    let llm = Arc::new(MockLlmProvider::default());
    let object_store = Arc::new(MockObjectStore::default());
    let handler = Arc::new(DefaultExtractionJobHandler::new(llm, object_store, ExtractionPipelineConfig::default()));

    let queue = Arc::new(TenantJobQueue::new(args.max_per_tenant_queue));
    let worker_config = WorkerPoolConfig { worker_count: args.workers, ..Default::default() };
    let (_worker_handles, worker_stats) = spawn_worker_pool(Arc::clone(&queue), handler, worker_config);

    let state = Arc::new(AppState { queue, worker_stats, worker_count: args.workers });
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await.with_context(|| format!("bind {}", args.bind))?;
    info!(bind = %args.bind, workers = args.workers, "orderflow-daemon listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("serve")
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
