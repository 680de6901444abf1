//! HTTP server for calclaw.
//!
//! A deliberately small surface:
//!
//! - `POST /chat` — one conversational turn: `{message}` in, `{response}` out.
//! - `GET /health` — liveness probe.
//! - `GET /tools` — the read-only tool catalog, for inspection.
//!
//! No conversation id is accepted: every request is an independent turn
//! against the shared, process-global agent state. Internal errors surface
//! as a generic failure, never a structured error the caller must interpret.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::agent::BookingAgent;
use crate::error::ServerError;
use crate::tools::{ToolDescriptor, ToolRegistry};

/// Shared server state.
pub struct AppState {
    /// The process-global agent.
    pub agent: BookingAgent,

    /// Tool catalog, for the inspection endpoint.
    pub registry: Arc<ToolRegistry>,
}

/// A chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's free-text message.
    pub message: String,
}

/// A chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The agent's free-text reply.
    pub response: String,
}

/// Build the application router.
pub fn router(state: Arc<AppState>, cors_enabled: bool) -> Router {
    let router = Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route("/tools", get(tools_handler))
        .with_state(state);

    if cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Bind and serve until the process exits.
pub async fn serve(
    state: Arc<AppState>,
    addr: &str,
    cors_enabled: bool,
) -> Result<(), ServerError> {
    let app = router(state, cors_enabled);

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ServerError::InvalidAddress(format!("{}: {}", addr, e)))?;

    tracing::info!("chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))
}

/// Chat handler: forward the message to the agent, return its reply verbatim.
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, "chat request received");

    match state.agent.chat(&request.message).await {
        Ok(response) => {
            tracing::debug!(%request_id, "chat request complete");
            Json(ChatResponse { response }).into_response()
        }
        Err(err) => {
            tracing::error!(%request_id, error = %err, "chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "The assistant could not complete this request."
                })),
            )
                .into_response()
        }
    }
}

/// Health check handler.
async fn health_handler() -> &'static str {
    "ok"
}

/// Tool catalog handler.
async fn tools_handler(State(state): State<Arc<AppState>>) -> Json<Vec<ToolDescriptor>> {
    Json(state.registry.descriptors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserialization() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message":"book a meeting"}"#).unwrap();
        assert_eq!(request.message, "book a meeting");
    }

    #[test]
    fn test_chat_response_serialization() {
        let response = ChatResponse {
            response: "Booked!".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"response":"Booked!"}"#);
    }
}
