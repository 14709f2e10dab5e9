//! Local control API module
//!
//! HTTP endpoints for issuing timer commands and reading session status.

pub mod handlers;
pub mod responses;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create_handler))
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/leave", post(leave_handler))
        .route("/snapshot", put(snapshot_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
