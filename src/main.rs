//! Dentora - backend for a dental community platform

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dentora::{
    api::{self, AppState},
    cache::MemoryCache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxAccountRepository, SqlxPostRepository, SqlxSessionRepository, SqlxStoryRepository,
        },
    },
    services::{
        AccountService, DailyPostGenerator, FeedService, LoginRateLimiter, VerificationService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dentora=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dentora backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = Arc::new(MemoryCache::new());
    tracing::info!("Cache initialized");

    // Create repositories
    let account_repo = SqlxAccountRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let story_repo = SqlxStoryRepository::boxed(pool.clone());

    // Initialize services
    let rate_limiter = Arc::new(LoginRateLimiter::new());
    let account_service = Arc::new(AccountService::new(
        account_repo.clone(),
        session_repo,
        rate_limiter.clone(),
    ));
    let verification_service = Arc::new(VerificationService::new(account_repo));
    let feed_service = Arc::new(FeedService::new(
        post_repo,
        story_repo,
        cache,
        Duration::from_secs(config.cache.ttl_seconds),
    ));
    let generator = Arc::new(DailyPostGenerator::new(
        feed_service.clone(),
        config.generation.author.clone(),
    ));

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        account_service: account_service.clone(),
        verification_service,
        feed_service,
        generator,
        upload_config: Arc::new(config.upload.clone()),
    };

    // Rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Expired session sweep (runs hourly)
    {
        let service = account_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match service.sweep_expired_sessions().await {
                    Ok(0) => {}
                    Ok(swept) => tracing::info!(swept, "Removed expired sessions"),
                    Err(e) => tracing::warn!("Failed to sweep expired sessions: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
