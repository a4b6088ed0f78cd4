use anyhow::Context;
use bazaar_api::{app, AppState};
use bazaar_store::app_config::{Config, DEV_JWT_SECRET};
use bazaar_store::{FileStore, KeyValueStore, MemoryStore, TracingEventSink};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_api=debug,bazaar=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Bazaar API on port {}", config.server.port);

    if config.auth.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("Using the development JWT secret; set BAZAAR__AUTH__JWT_SECRET in production");
    }

    let store: Arc<dyn KeyValueStore> = match &config.storage.data_dir {
        Some(dir) => {
            tracing::info!("Persisting data under {}", dir.display());
            Arc::new(FileStore::open(dir.clone()).context("Failed to open data directory")?)
        }
        None => {
            tracing::warn!("No storage.data_dir configured; data lives in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState::new(&config, store, Arc::new(TracingEventSink));
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
