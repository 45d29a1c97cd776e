//! Presentation countdown synchronization server
//!
//! Keeps an operator console and any number of display screens in
//! lockstep on one countdown: running/paused/elapsed state and audible
//! bell cues, consistent to within a tick (~100ms).
//!
//! ## Architecture
//!
//! 1. Timer - authoritative countdown state, command protocol, advancement loop
//! 2. RealtimeHub - WebSocket distribution to connected viewers
//! 3. WebAPI - pages, WebSocket upgrade, health, static assets
//! 4. Pages / Qr / NetUtil - landing page collaborators (templates, QR codes, LAN address)
//!
//! ## Design Principles
//!
//! - Single writer: all timer mutation funnels through `TimerService`
//! - Elapsed time is derived from a monotonic anchor, never accumulated
//! - Broadcast is best-effort per session and never blocks a mutation

pub mod error;
pub mod models;
pub mod netutil;
pub mod pages;
pub mod qr;
pub mod realtime_hub;
pub mod state;
pub mod timer;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
