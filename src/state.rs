//! Application state
//!
//! Holds all shared components and state

use crate::realtime_hub::RealtimeHub;
use crate::timer::TimerService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HTML template directory
    pub template_dir: PathBuf,
    /// Static asset directory (bell audio)
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            template_dir: std::env::var("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("templates")),
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub timer: Arc<TimerService>,
    pub realtime: Arc<RealtimeHub>,
    pub started_at: Instant,
}
