//! HTTP API module
//!
//! The presentation and intent boundary for the timer-side daemon: timer
//! control, inbound settings, and status for remote displays.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{state::AppState, sync::SettingsReceiver};
use handlers::*;

/// Shared context for HTTP handlers
pub struct ApiContext {
    pub state: Arc<AppState>,
    pub receiver: SettingsReceiver,
}

/// Create the HTTP router with all endpoints
pub fn create_router(ctx: Arc<ApiContext>) -> Router {
    Router::new()
        .route("/timer/start", post(start_timer_handler))
        .route("/timer/stop", post(stop_timer_handler))
        .route("/settings", post(settings_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
