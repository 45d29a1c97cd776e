//! Router smoke tests: pages render and the health endpoint answers.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use podium_timer::realtime_hub::RealtimeHub;
use podium_timer::state::{AppConfig, AppState};
use podium_timer::timer::TimerService;
use podium_timer::web_api;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;

fn make_router() -> Router {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 8000,
        template_dir: manifest_dir.join("templates"),
        static_dir: manifest_dir.join("static"),
    };

    let realtime = Arc::new(RealtimeHub::new());
    let timer = Arc::new(TimerService::new(realtime.clone()));

    web_api::create_router(AppState {
        config,
        timer,
        realtime,
        started_at: Instant::now(),
    })
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let response = make_router()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, bytes.to_vec())
}

#[tokio::test]
async fn health_reports_idle_server() {
    let (status, body) = get("/api/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["ok"], true);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["sessions"], 0);
    assert_eq!(json["data"]["running"], false);
}

#[tokio::test]
async fn index_page_substitutes_placeholders() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).expect("utf8 html");
    assert!(html.contains("<html"));
    assert!(!html.contains("{{IP}}"));
    assert!(!html.contains("{{PORT}}"));
    assert!(!html.contains("{{QR_ADMIN}}"));
    assert!(!html.contains("{{QR_DISPLAY}}"));
}

#[tokio::test]
async fn console_and_display_pages_render() {
    for uri in ["/admin", "/display"] {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::OK, "page {uri}");

        let html = String::from_utf8(body).expect("utf8 html");
        assert!(html.contains("/api/ws"), "page {uri} connects to the hub");
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
