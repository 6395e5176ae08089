use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinta_fresca_api::auth::GoTrueClient;
use tinta_fresca_api::config::AppConfig;
use tinta_fresca_api::database::{DatabaseManager, PgStore};
use tinta_fresca_api::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "tinta-fresca-api", version, about = "Tinta Fresca school directory API")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long, short)]
    port: Option<u16>,

    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}. Check your .env file.", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, args).await {
        tracing::error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(mut config: AppConfig, args: Args) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }

    tracing::info!("Starting Tinta Fresca API in {:?} mode", config.environment);

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the store")?;
    let identity = GoTrueClient::new(&config.identity).context("failed to build identity client")?;
    if identity.verifies_locally() {
        tracing::info!("Bearer tokens are verified locally");
    }

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let state = AppState::new(config, Arc::new(PgStore::new(db)), Arc::new(identity));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
