//! Newsroom - A news platform backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsroom::{
    api::{self, middleware::RequestStats, AppState},
    cache::MemoryCache,
    config::Config,
    db::{
        self,
        repositories::{SqlxNewsRepository, SqlxUserRepository},
    },
    services::{AuthService, EmailService, ImageStorage, NewsService, TokenService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsroom=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Newsroom backend...");

    // Load configuration (file + NEWSROOM_* environment overrides)
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected");

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = Arc::new(MemoryCache::with_capacity_and_ttl(
        config.cache.max_entries,
        Duration::from_secs(config.cache.ttl_seconds),
    ));
    tracing::info!(ttl_seconds = config.cache.ttl_seconds, "Cache initialized");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let news_repo = SqlxNewsRepository::boxed(pool.clone());

    // Create services
    let token_service = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        Duration::from_secs(config.auth.token_ttl_days * 24 * 60 * 60),
    ));
    let auth_service = Arc::new(AuthService::new(user_repo, token_service.clone()));
    let image_storage = Arc::new(ImageStorage::new(config.upload.clone()));
    let news_service = Arc::new(NewsService::new(
        news_repo,
        cache,
        image_storage,
        Duration::from_secs(config.cache.ttl_seconds),
    ));
    let email_service = Arc::new(EmailService::new(config.smtp.clone()));

    // Build application state
    let state = AppState {
        auth_service,
        news_service,
        email_service,
        token_service,
        request_stats: Arc::new(RequestStats::new()),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin, &config.upload.path);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
