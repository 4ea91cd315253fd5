use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
    error::DatabaseError,
};
use films::{
    AppState,
    config::{AppConfig, SessionBackend},
    credentials::CredentialStore,
    repositories::{PgFilmRepository, PgUserRepository},
    routes,
    session::{InMemorySessionStore, RedisSessionStore, SessionManager, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting film service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    let session_store: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Memory => {
            info!("Keeping sessions in memory");
            Arc::new(InMemorySessionStore::new())
        }
        SessionBackend::Redis => {
            let redis_config = RedisConfig::from_env()?;
            let redis_pool = RedisPool::new(&redis_config).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            info!("Keeping sessions in Redis");
            Arc::new(RedisSessionStore::new(
                redis_pool,
                config.session.ttl_seconds,
            ))
        }
    };

    let app_state = AppState {
        films: Arc::new(PgFilmRepository::new(pool.clone())),
        credentials: CredentialStore::new(Arc::new(PgUserRepository::new(pool))),
        sessions: SessionManager::new(session_store),
        cookie: config.session.cookie.clone(),
    };

    let mut app = routes::create_router(app_state);
    if let Some(origin) = &config.cors_allowed_origin {
        app = app.layer(routes::cors_layer(origin)?);
        info!("CORS enabled for {}", origin);
    }

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Film service listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Film service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down film service");
}
