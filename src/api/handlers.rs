//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::Value;
use tracing::{error, info};

use super::{
    responses::{ApiResponse, HealthResponse, StatusResponse},
    ApiContext,
};
use crate::commands::TimerCommand;

/// Handle POST /timer/start - reset-and-start a new timer
pub async fn start_timer_handler(
    State(ctx): State<Arc<ApiContext>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match ctx.state.send_command(TimerCommand::StartNewTimer).await {
        Ok(()) => {
            info!("Start endpoint called - new timer requested");
            Ok(Json(ApiResponse::accepted("New timer started".to_string())))
        }
        Err(e) => {
            error!("Failed to queue start command: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/stop - stop and clear the timer
pub async fn stop_timer_handler(
    State(ctx): State<Arc<ApiContext>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match ctx.state.send_command(TimerCommand::StopTimer).await {
        Ok(()) => {
            info!("Stop endpoint called - timer stop requested");
            Ok(Json(ApiResponse::accepted("Timer stopped".to_string())))
        }
        Err(e) => {
            error!("Failed to queue stop command: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /settings - inbound settings payload from the editing side
///
/// Funnels through the same validation path as channel deliveries; a
/// malformed payload is rejected with 400 and the previous settings stay in
/// effect.
pub async fn settings_handler(
    State(ctx): State<Arc<ApiContext>>,
    Json(payload): Json<Value>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    match ctx.receiver.handle_payload(&payload) {
        Ok(settings) => Ok(Json(ApiResponse::applied(format!(
            "Settings applied: first={}s, repeat={}s",
            settings.first_rotation, settings.repeat_interval
        )))),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!("Invalid settings: {}", e))),
        )),
    }
}

/// Handle GET /status - current timer state
pub async fn status_handler(
    State(ctx): State<Arc<ApiContext>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = match ctx.state.timer_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let settings = match ctx.state.settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to get timer settings: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    Ok(Json(StatusResponse::new(
        snapshot,
        settings,
        ctx.state.uptime(),
        ctx.state.port,
        ctx.state.host.clone(),
    )))
}

/// Handle GET /health - health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
