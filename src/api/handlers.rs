//! HTTP endpoint handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::{AppState, TimerSnapshot},
    tasks::{ControlError, LocalCommand},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

type CommandResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Forward a command to the session driver and map the outcome to HTTP
async fn run_command(state: &AppState, command: LocalCommand, label: &str) -> CommandResult {
    match state.session.execute(command).await {
        Ok(session) => {
            info!("{} endpoint called - command sent", label);
            Ok(Json(ApiResponse::ok(format!("{} sent", label), session)))
        }
        Err(ControlError::Rejected(reason)) => {
            info!("{} endpoint called - no effect: {}", label, reason);
            Err((
                StatusCode::CONFLICT,
                Json(ApiResponse::rejected(reason.to_string(), state.session.status())),
            ))
        }
        Err(e @ ControlError::SessionGone) => {
            error!("{} endpoint failed: {}", label, e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::unavailable(e.to_string())),
            ))
        }
    }
}

/// Handle POST /create - Register the timer with the server (owner)
pub async fn create_handler(State(state): State<AppState>) -> CommandResult {
    run_command(&state, LocalCommand::Create, "Create").await
}

/// Handle POST /start - Start the countdown (owner)
pub async fn start_handler(State(state): State<AppState>) -> CommandResult {
    run_command(&state, LocalCommand::Start, "Start").await
}

/// Handle POST /pause - Pause the countdown (owner)
pub async fn pause_handler(State(state): State<AppState>) -> CommandResult {
    run_command(&state, LocalCommand::Pause, "Pause").await
}

/// Handle POST /resume - Resume a paused countdown (owner)
pub async fn resume_handler(State(state): State<AppState>) -> CommandResult {
    run_command(&state, LocalCommand::Resume, "Resume").await
}

/// Handle POST /leave - Best-effort leave (client)
pub async fn leave_handler(State(state): State<AppState>) -> CommandResult {
    run_command(&state, LocalCommand::Leave, "Leave").await
}

/// Handle PUT /snapshot - Re-initialize from a freshly fetched snapshot
pub async fn snapshot_handler(
    State(state): State<AppState>,
    Json(snapshot): Json<TimerSnapshot>,
) -> CommandResult {
    run_command(&state, LocalCommand::Resync(snapshot), "Resync").await
}

/// Handle GET /status - Return current session status
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        session: state.session.status(),
        client_id: state.client_id.to_string(),
        role: state.role,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
