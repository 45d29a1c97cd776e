//! HTTP routes and WebSocket handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use tower_http::services::ServeDir;

use crate::error::Result;
use crate::models::{ApiResponse, HealthResponse};
use crate::netutil;
use crate::pages;
use crate::qr;
use crate::realtime_hub::HubMessage;
use crate::state::AppState;
use crate::timer::{ClientMessage, StatePayload};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let static_service = ServeDir::new(&state.config.static_dir);

    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/admin", get(admin_page))
        .route("/display", get(display_page))
        // API
        .route("/api/health", get(health))
        // WebSocket
        .route("/api/ws", get(websocket_handler))
        // Static assets (bell audio)
        .nest_service("/static", static_service)
        .with_state(state)
}

// ========================================
// Page Handlers
// ========================================

/// Landing page with connection QR codes
async fn index_page(State(state): State<AppState>) -> Result<Html<String>> {
    let ip = netutil::lan_ip();
    let port = state.config.port.to_string();
    let admin_url = format!("http://{ip}:{port}/admin");
    let display_url = format!("http://{ip}:{port}/display");
    let qr_admin = qr::data_uri(&admin_url);
    let qr_display = qr::data_uri(&display_url);

    let html = pages::render(
        &state.config.template_dir,
        "index.html",
        &[
            ("IP", ip.as_str()),
            ("PORT", port.as_str()),
            ("QR_ADMIN", qr_admin.as_str()),
            ("QR_DISPLAY", qr_display.as_str()),
        ],
    )
    .await?;

    Ok(Html(html))
}

/// Operator console page
async fn admin_page(State(state): State<AppState>) -> Result<Html<String>> {
    let html = pages::render(&state.config.template_dir, "admin.html", &[]).await?;
    Ok(Html(html))
}

/// Passive display page
async fn display_page(State(state): State<AppState>) -> Result<Html<String>> {
    let html = pages::render(&state.config.template_dir, "display.html", &[]).await?;
    Ok(Html(html))
}

// ========================================
// API Handlers
// ========================================

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.timer.snapshot().await;

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_sec: state.started_at.elapsed().as_secs(),
        sessions: state.realtime.connection_count(),
        running: snapshot.running,
    };

    Json(ApiResponse::success(response))
}

// ========================================
// WebSocket Handler
// ========================================

/// WebSocket upgrade handler
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Register with RealtimeHub
    let (conn_id, mut rx) = state.realtime.register().await;

    // A newly connected viewer sees current state, not history.
    let snapshot = state.timer.snapshot().await;
    state
        .realtime
        .send_to(&conn_id, HubMessage::State(StatePayload::new(snapshot)))
        .await;

    // Forward hub messages to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Apply incoming commands
    let timer = state.timer.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Cmd(command)) => timer.apply(command).await,
                    Err(e) => {
                        tracing::debug!(connection_id = %conn_id, error = %e, "Ignoring undecodable frame");
                    }
                },
                Ok(Message::Ping(data)) => {
                    // Pong is handled automatically by axum
                    tracing::trace!("Received ping: {:?}", data);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %conn_id, "WebSocket client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
        conn_id
    });

    // Wait for either task to complete
    let conn_id = tokio::select! {
        _ = send_task => conn_id,
        result = recv_task => result.unwrap_or(conn_id),
    };

    // Unregister from hub
    state.realtime.unregister(&conn_id).await;
}
