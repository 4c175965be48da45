//! Completion API integrations

mod openai_compat;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::conversation::Message;

pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No choices in response")]
    EmptyResponse,
}

impl ProviderError {
    /// Short description that is safe to show to API callers
    pub fn public_message(&self) -> String {
        match self {
            ProviderError::Request(e) if e.is_timeout() => "upstream request timed out".into(),
            ProviderError::Request(e) if e.is_connect() => "could not reach upstream".into(),
            ProviderError::Request(_) => "upstream request failed".into(),
            ProviderError::Timeout => "upstream request timed out".into(),
            ProviderError::Unauthorized(_) => "upstream authentication failed".into(),
            ProviderError::RateLimited(_) => "upstream rate limit exceeded".into(),
            ProviderError::Status { status, .. } => format!("upstream returned HTTP {}", status),
            ProviderError::InvalidResponse(_) => "malformed upstream response".into(),
            ProviderError::EmptyResponse => "upstream returned no reply".into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            ProviderError::Timeout => true,
            ProviderError::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// One call to the completion API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The external model that turns a message list into a reply
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the content of the first choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}
