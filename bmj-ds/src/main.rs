//! bmj-ds - reference data service for the Badminton Journey client
//!
//! Keeps the competition hierarchy in memory and stores uploads under the
//! root folder.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bmj_common::config::{ensure_root_folder, resolve_root_folder, TomlConfig};
use bmj_ds::storage::FileStore;
use bmj_ds::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "bmj-ds", version, about = "Badminton Journey data service")]
struct Args {
    /// HTTP port (overrides the config file)
    #[arg(long, env = "BMJ_PORT")]
    port: Option<u16>,

    /// Root folder for uploads
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Config file path
    #[arg(long, env = "BMJ_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default(args.config.as_deref());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            subscriber
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => subscriber.init(),
    }

    info!(
        "Starting Badminton Journey data service (bmj-ds) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    ensure_root_folder(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let files = FileStore::new(&root_folder, config.uploads.clone());
    files.init().await?;

    let state = AppState::new(files, &config.uploads);
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("bmj-ds listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
