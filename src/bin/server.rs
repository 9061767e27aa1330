//! Registry Server CLI
//!
//! Serves the schema registry REST API over a durable SQLite log.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use schema_registry::{HttpServer, RegistryConfig, SqlStore, Storage};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "registry-server")]
#[command(about = "Serve the schema registry REST API")]
struct Cli {
    /// Path to a configuration file (registry.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_ref().and_then(|p| p.to_str());
    let config = RegistryConfig::load_from(config_path)?;

    let storage: Arc<SqlStore> = Arc::new(SqlStore::open(&config.storage)?);
    let server = HttpServer::new(config.server.clone(), storage.clone());

    server.start().await?;

    storage.close();
    Ok(())
}
