//! Slash command HTTP endpoint.

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use warden_commands::{CommandProcessManager, SlashCommand};

/// State shared by the handlers.
#[derive(Clone)]
pub struct ApiState {
    manager: Arc<CommandProcessManager>,
}

impl ApiState {
    /// Create state dispatching to `manager`.
    pub fn new(manager: Arc<CommandProcessManager>) -> Self {
        Self { manager }
    }
}

/// Router with the command endpoint and a health check.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1", post(handle_command))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Answers with the immediate text, nothing when postponed, or the error.
///
/// Errors are sent with a success status so the chat shows them to the
/// user.
async fn handle_command(
    State(state): State<ApiState>,
    Form(command): Form<SlashCommand>,
) -> impl IntoResponse {
    tracing::debug!(command = %command.command, channel = %command.channel_name, "Received command");
    match state.manager.process_command(&command) {
        Ok(result) if result.postponed => (StatusCode::OK, String::new()),
        Ok(result) => (StatusCode::OK, result.text),
        Err(e) => {
            tracing::warn!(command = %command.command, error = %e, "Command rejected");
            (StatusCode::OK, format!("Error: {:?}", e.message()))
        }
    }
}
