//! Presentation countdown synchronization server
//!
//! Main entry point.

use podium_timer::{
    netutil,
    realtime_hub::RealtimeHub,
    state::{AppConfig, AppState},
    timer::TimerService,
    web_api,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "podium_timer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting podium-timer v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        host = %config.host,
        port = config.port,
        template_dir = %config.template_dir.display(),
        static_dir = %config.static_dir.display(),
        "Configuration loaded"
    );

    // The static dir holds the bell audio; create it so ServeDir has a root.
    std::fs::create_dir_all(&config.static_dir).ok();

    // Initialize components
    let realtime = Arc::new(RealtimeHub::new());
    let timer = Arc::new(TimerService::new(realtime.clone()));
    tracing::info!("TimerService initialized");

    // Create application state
    let state = AppState {
        config: config.clone(),
        timer,
        realtime,
        started_at: Instant::now(),
    };

    let app = web_api::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Shareable URLs for the room
    let ip = netutil::lan_ip();
    tracing::info!("Landing : http://{}:{}/", ip, config.port);
    tracing::info!("Console : http://{}:{}/admin", ip, config.port);
    tracing::info!("Display : http://{}:{}/display", ip, config.port);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
