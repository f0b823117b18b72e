// Main entry point for the relay hub

use std::sync::Arc;

use anyhow::{Context, Result};
use relay::{advertise_address, build_app, Config, HubService, MemoryStore, PostStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relay=debug,capture=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting post triage relay hub");

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = build_store(&config).await?;

    let advertise = advertise_address(config.advertise_addr.as_deref(), config.port);
    tracing::info!("Advertising relay address: {}", advertise);

    let hub = Arc::new(HubService::new(store, advertise));
    let app = build_app(hub);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(feature = "sqlite")]
async fn build_store(config: &Config) -> Result<Arc<dyn PostStore>> {
    if let Some(url) = &config.database_url {
        tracing::info!("Using sqlite post store: {}", url);
        let store = relay::SqliteStore::new(url)
            .await
            .context("Failed to open sqlite store")?;
        return Ok(Arc::new(store));
    }
    tracing::info!("Using in-memory post store");
    Ok(Arc::new(MemoryStore::new()))
}

#[cfg(not(feature = "sqlite"))]
async fn build_store(config: &Config) -> Result<Arc<dyn PostStore>> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but the sqlite feature is off; using the in-memory store");
    }
    Ok(Arc::new(MemoryStore::new()))
}
