// CMA Dashboard - Web Server
// REST API with Axum over the same local store the TUI uses

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use cma_dashboard::{
    api::{router, AppState},
    config::Config,
    logging, Dashboard, MlsClient,
};

#[derive(Parser)]
#[command(name = "cma-server", version, about = "CMA dashboard REST API")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind, overriding the config file
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_stderr();

    println!("🌐 CMA Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::load(args.config.as_deref())?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let dashboard = Dashboard::open(&config)?;
    println!("✓ Local store opened: {}", config.database_path().display());

    let state = AppState::new(dashboard, MlsClient::from_config(&config.mls));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    println!("\n🚀 Server running on http://{}", bind);
    println!("   API: http://{}/api/state", bind);
    println!("\n   Press Ctrl+C to stop\n");
    info!(bind = %bind, "server started");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
