//! WebAPI - HTTP surface
//!
//! ## Responsibilities
//!
//! - Page routes (landing, operator console, display)
//! - WebSocket upgrade and session lifecycle
//! - Health endpoint and static asset serving

mod routes;

pub use routes::create_router;
