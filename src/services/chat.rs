//! Chat-completion client for the dashboard assistant.
//!
//! Talks to an OpenAI-compatible chat completions endpoint with a fixed
//! agricultural-advisor system prompt. The route falls back to a canned
//! reply when the upstream is unreachable, so the chatbot degrades instead
//! of erroring.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Default completion model, overridable via config.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const MAX_TOKENS: u32 = 512;
const TEMPERATURE: f32 = 0.4;

// --- Chat completions request/response types ---

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Send one user message under a system prompt, returning assistant text.
    pub async fn complete(&self, system_prompt: &str, message: &str) -> Result<String, AppError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: message.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("chat request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "chat service returned HTTP {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("chat JSON parse error: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                AppError::ExternalServiceError("chat service returned no content".to_string())
            })
    }
}

/// System prompt for the farming assistant, optionally asking for replies in
/// a specific language.
pub fn advisor_system_prompt(language: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an agricultural market assistant for Indian farmers and traders. \
         Answer questions about crop prices, weather impact on crops, mandi trends \
         and farming practices. Be concise and practical. If asked about topics \
         unrelated to agriculture, politely steer back to farming.",
    );
    if let Some(lang) = language {
        if !lang.trim().is_empty() && !lang.trim().eq_ignore_ascii_case("english") {
            prompt.push_str(&format!(" Reply in {}.", lang.trim()));
        }
    }
    prompt
}

/// Canned reply used when the chat upstream is unavailable.
pub fn fallback_reply() -> String {
    "The assistant is temporarily unavailable. Meanwhile, you can check current \
     crop prices, weather impact and market news from the dashboard."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_system_prompt_language_suffix() {
        let plain = advisor_system_prompt(None);
        assert!(!plain.contains("Reply in"));

        let english = advisor_system_prompt(Some("English"));
        assert!(!english.contains("Reply in"));

        let hindi = advisor_system_prompt(Some("Hindi"));
        assert!(hindi.ends_with("Reply in Hindi."));
    }

    #[tokio::test]
    async fn test_complete_returns_assistant_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Sow after the first rain."},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "test-key", DEFAULT_MODEL);
        let reply = client
            .complete(&advisor_system_prompt(None), "When should I sow paddy?")
            .await
            .unwrap();
        assert_eq!(reply, "Sow after the first rain.");
    }

    #[tokio::test]
    async fn test_complete_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "chatcmpl-2", "choices": []})),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "test-key", DEFAULT_MODEL);
        assert!(client.complete("system", "hello").await.is_err());
    }

    #[tokio::test]
    async fn test_complete_maps_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "test-key", DEFAULT_MODEL);
        assert!(matches!(
            client.complete("system", "hello").await,
            Err(AppError::ExternalServiceError(_))
        ));
    }
}
