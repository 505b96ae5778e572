use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calm_news::aggregator::Aggregator;
use calm_news::cache::NewsCache;
use calm_news::config::Config;
use calm_news::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calm_news=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("FEEDS_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load_or_default(&config_path)?;
    for (category, urls) in config.categories() {
        info!("Category '{}': {} feeds", category, urls.len());
    }

    let aggregator = Aggregator::from_config(&config)?;
    let cache = NewsCache::new(aggregator, config.refresh_threshold());

    let state = Arc::new(AppState {
        cache,
        serve_stale_on_error: config.serve_stale_on_error,
    });

    // Build router
    let app = Router::new()
        .route("/api/news", get(routes::get_news))
        .route("/api/preferences", post(routes::save_preferences))
        .route("/health", get(routes::health))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server starting on http://localhost:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
