//! OpenAI-compatible completion provider
//!
//! Works with any API that implements the OpenAI chat completions format.
//! Groq is the default target:
//! - Groq (api.groq.com/openai/v1)
//! - OpenAI (api.openai.com)
//! - vLLM / LM Studio / LocalAI (local server)
//!
//! # Configuration
//!
//! ```text
//! GROQ_API_KEY=gsk_...
//! GROQ_BASE_URL=https://api.groq.com/openai/v1
//! REQUEST_TIMEOUT_SECS=60
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::conversation::Message;

use super::{CompletionClient, CompletionRequest, ProviderError};

/// OpenAI-compatible chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

impl From<&CompletionRequest> for ChatCompletionRequest {
    fn from(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: request.messages.iter().map(ChatMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Error response from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// Base URL for the API (e.g., https://api.groq.com/openai/v1)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAICompatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl OpenAICompatConfig {
    /// Create config for Groq
    pub fn groq(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Point at another OpenAI-compatible server (vLLM, LM Studio, etc.)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI-compatible API provider
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: Client,
}

impl OpenAICompatProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: OpenAICompatConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAICompatProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest::from(request);

        let mut req_builder = self.client.post(self.completions_url());

        // A missing key is not checked here; the API answers 401
        if let Some(ref api_key) = self.config.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        parse_completion(status, &text)
    }
}

/// Turn a raw HTTP answer into the first choice's content
fn parse_completion(status: StatusCode, body: &str) -> Result<String, ProviderError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Unauthorized(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
            _ => ProviderError::Status {
                status: status.as_u16(),
                message,
            },
        });
    }

    let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::InvalidResponse(format!("Failed to parse response: {} - Body: {}", e, body))
    })?;

    if let Some(usage) = &completion.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion usage"
        );
    }

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    Ok(choice.message.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_config_presets() {
        let groq = OpenAICompatConfig::groq(Some("gsk-key".to_string()));
        assert!(groq.base_url.contains("groq.com"));
        assert_eq!(groq.api_key, Some("gsk-key".to_string()));

        let local = OpenAICompatConfig::groq(None)
            .with_base_url("http://localhost:8000/v1")
            .with_timeout(5);
        assert!(local.api_key.is_none());
        assert_eq!(local.base_url, "http://localhost:8000/v1");
        assert_eq!(local.timeout_secs, 5);
    }

    #[test]
    fn test_message_conversion() {
        let msg = Message {
            role: Role::User,
            content: "Hello".to_string(),
        };
        let chat_msg = ChatMessage::from(&msg);
        assert_eq!(chat_msg.role, "user");
        assert_eq!(chat_msg.content, "Hello");
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest {
            model: "llama-3.3-70b-versatile".into(),
            messages: vec![Message::system("be nice"), Message::user("hi")],
            temperature: 0.7,
            max_tokens: 200,
        };

        let body = serde_json::to_value(ChatCompletionRequest::from(&request)).unwrap();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;

        let reply = parse_completion(StatusCode::OK, body).unwrap();
        assert_eq!(reply, "first");
    }

    #[test]
    fn test_parse_no_choices() {
        let err = parse_completion(StatusCode::OK, r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_completion(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_error_statuses() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;

        let err = parse_completion(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized(ref m) if m == "Invalid API Key"));

        let err = parse_completion(StatusCode::TOO_MANY_REQUESTS, body).unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));

        let err = parse_completion(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status { status: 502, ref message } if message == "upstream down"
        ));
    }
}
