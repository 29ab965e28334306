//! Chatbot endpoint.
//!
//! Forwards the user's message to the chat-completion upstream under a fixed
//! agricultural-advisor system prompt. Upstream failure degrades to a canned
//! reply rather than an error, so the chat panel never breaks.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::AppState;
use crate::services::chat::{advisor_system_prompt, fallback_reply};

/// Longest accepted user message, in characters.
const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Preferred reply language (e.g. "Hindi"); defaults to English
    pub language: Option<String>,
}

/// Assistant reply; `degraded` is true when the upstream was unavailable
/// and the reply is canned.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    pub degraded: bool,
}

/// Send a message to the farming assistant.
#[utoipa::path(
    post,
    path = "/api/v1/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply, canned when upstream is down", body = ChatResponse),
        (status = 400, description = "Empty or oversized message", body = ErrorResponse),
    )
)]
pub async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::BadRequest(format!(
            "message must be at most {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    let system_prompt = advisor_system_prompt(body.language.as_deref());

    match state.chat.complete(&system_prompt, message).await {
        Ok(reply) => Ok(Json(ChatResponse {
            reply,
            degraded: false,
        })),
        Err(e) => {
            tracing::warn!("Chat upstream unavailable: {}", e);
            Ok(Json(ChatResponse {
                reply: fallback_reply(),
                degraded: true,
            }))
        }
    }
}
