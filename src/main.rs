use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dns_manager_api::{
    api, AppState, ClerkVerifier, CloudflareClient, Config, LogFormat, SurrealUserStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }

    info!("🚀 Starting DNS manager API v{}", env!("CARGO_PKG_VERSION"));

    info!("💾 Connecting to database at {}...", config.database_url);
    let users = SurrealUserStore::connect(&config)
        .await
        .context("Failed to connect to the user database")?;
    info!("✅ Database connection established.");

    let state = AppState {
        dns: Arc::new(CloudflareClient::new(&config)?),
        identity: Arc::new(ClerkVerifier::new(&config)?),
        users: Arc::new(users),
        template_path: Arc::new(config.template_path.clone()),
    };
    info!("📄 DNS template: {}", config.template_path.display());

    let app = api::app(state, &config.frontend_url)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("📡 Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
