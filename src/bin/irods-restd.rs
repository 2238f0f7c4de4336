use clap::Parser;
use irods_rest::server::{Daemon, ServerConfig};
use irods_rest::storage::{CatalogSeed, MemoryCatalog};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "irods-restd", about = "REST gateway for iRODS collections", version)]
struct Args {
  #[arg(short, long)]
  config: Option<String>,
  #[arg(short, long)]
  port: Option<u16>,
  #[arg(long)]
  host: Option<String>,
  /// YAML file seeding the in-memory catalog
  #[arg(long, env = "IRODS_REST_CATALOG")]
  catalog: Option<String>,
  #[arg(long, env = "IRODS_REST_ZONE")]
  zone: Option<String>,
  #[arg(long)]
  log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
  let args = Args::parse();

  // Load config: explicit path > auto-detect > defaults
  let mut config = if let Some(path) = &args.config {
    ServerConfig::from_file(path)?
  } else {
    ServerConfig::find_and_load()?.unwrap_or_default()
  };

  // CLI args override config file
  if let Some(port) = args.port {
    config.server.port = port;
  }
  if let Some(host) = args.host {
    config.server.host = host;
  }
  if let Some(path) = args.catalog {
    config.catalog.seed_path = Some(path);
  }
  if let Some(zone) = args.zone {
    config.irods.zone = zone;
  }
  if let Some(level) = args.log_level {
    config.logging.level = level;
  }

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let seed = match &config.catalog.seed_path {
    Some(path) => {
      tracing::info!("Loading catalog seed from {}", path);
      CatalogSeed::from_file(path)?
    }
    None => {
      tracing::warn!("No catalog seed configured, serving an empty catalog");
      CatalogSeed::default()
    }
  };
  let catalog = MemoryCatalog::from_seed(&config.irods.zone, config.catalog.page_size, &seed)?;

  let daemon = Arc::new(Daemon::new(config, Arc::new(catalog)));
  let daemon_clone = daemon.clone();

  // Handle shutdown signals (SIGINT, SIGTERM)
  tokio::spawn(async move {
    shutdown_signal().await;
    daemon_clone.shutdown();

    // Give in-flight requests time to drain
    tokio::time::sleep(Duration::from_secs(5)).await;
    tracing::info!("Shutdown complete");
    std::process::exit(0);
  });

  daemon.run().await
}

async fn shutdown_signal() {
  let ctrl_c = async {
    tokio::signal::ctrl_c()
      .await
      .expect("Failed to install Ctrl+C handler");
  };

  #[cfg(unix)]
  let terminate = async {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
      .expect("Failed to install SIGTERM handler")
      .recv()
      .await;
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("Received SIGINT"),
    _ = terminate => tracing::info!("Received SIGTERM"),
  }
}
