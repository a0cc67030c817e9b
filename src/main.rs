use std::sync::Arc;

use movie_ratings::{
    api::{create_router, AppState},
    config::{Config, StorageBackend},
    db::{
        create_pool, create_redis_client, run_migrations, InMemorySessions, InMemoryStore,
        PgStore, RatingsStore, RedisSessions, SessionStore,
    },
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    let store: Arc<dyn RatingsStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisSessions::new(
            create_redis_client(url)?,
            config.session_ttl_secs,
        )),
        None => Arc::new(InMemorySessions::new(config.session_ttl_secs)),
    };

    let app = create_router(AppState::new(store, sessions));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        backend = ?config.storage_backend,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
