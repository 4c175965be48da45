//! Chat engine
//!
//! The ChatEngine runs one chat turn end to end:
//! 1. Validates the user's message
//! 2. Resolves the system prompt (personality or fixed default)
//! 3. Records the message and windows the history (history mode)
//! 4. Calls the completion API with a bounded wait
//! 5. Records the reply (history mode) and returns it

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ChatMode, Config, Personality, PersonalityRegistry};
use crate::conversation::{Message, SessionStore, DEFAULT_SESSION};
use crate::providers::{CompletionClient, CompletionRequest, ProviderError};

use super::prompt;

/// Sampling temperature for every completion
pub const TEMPERATURE: f32 = 0.7;

/// Longest session id accepted from a client
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Request to the chat engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    #[serde(default)]
    pub message: String,

    /// Personality key; unknown keys and non-string values fall back to "helpful"
    #[serde(default)]
    pub personality: Option<Value>,

    /// Conversation to continue; requests without one share the default session
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// The requested personality, if it is a string at all
    pub fn personality_key(&self) -> Option<&str> {
        self.personality.as_ref().and_then(Value::as_str)
    }

    /// The session to use; blank ids mean the default session
    fn session_id(&self) -> Result<&str, ChatError> {
        match self.session_id.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_SESSION),
            Some(id) if id.len() > MAX_SESSION_ID_LEN => Err(ChatError::InvalidSessionId),
            Some(id) => Ok(id),
        }
    }
}

/// Response from the chat engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("No message provided")]
    EmptyMessage,

    #[error("Invalid session id")]
    InvalidSessionId,

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Fixed parameters of every turn
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub mode: ChatMode,
    pub model: String,
    pub history_window: usize,
    pub timeout: Duration,
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.mode,
            model: config.model.clone(),
            history_window: config.history_window,
            timeout: config.request_timeout(),
        }
    }
}

/// The core chat engine
pub struct ChatEngine {
    settings: ChatSettings,
    personalities: PersonalityRegistry,
    sessions: SessionStore,
    client: Arc<dyn CompletionClient>,
}

impl ChatEngine {
    /// Create a new chat engine
    pub fn new(
        settings: ChatSettings,
        personalities: PersonalityRegistry,
        sessions: SessionStore,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            settings,
            personalities,
            sessions,
            client,
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.settings.mode
    }

    pub fn personalities(&self) -> &PersonalityRegistry {
        &self.personalities
    }

    /// Process a chat request and return the reply
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let session_id = request.session_id()?;

        // The deadline covers waiting for the session as well as the upstream call
        let turn = async {
            match self.settings.mode {
                ChatMode::Personality => {
                    let personality = request.personality_key();
                    tracing::info!(
                        "User ({}): {}",
                        personality.unwrap_or(Personality::DEFAULT.key()),
                        message
                    );

                    let system_prompt = self.personalities.resolve(personality);
                    let messages = prompt::assemble(system_prompt, &[Message::user(message)]);
                    self.complete(messages).await
                }
                ChatMode::History => {
                    tracing::info!(session = %session_id, "User: {}", message);

                    // Held for the whole turn so concurrent turns cannot interleave
                    let conversation = self.sessions.conversation(session_id).await;
                    let mut history = conversation.lock().await;

                    history.append(Message::user(message));
                    let window = history.windowed(self.settings.history_window);
                    let system_prompt = self.personalities.prompt(Personality::DEFAULT);
                    let messages = prompt::assemble(system_prompt, &window);

                    let reply = self.complete(messages).await?;
                    history.append(Message::assistant(reply.clone()));
                    Ok(reply)
                }
            }
        };

        let result = match tokio::time::timeout(self.settings.timeout, turn).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        };

        let reply = result.map_err(|e| {
            tracing::error!(error = ?e, model = %self.settings.model, "Completion request failed: {}", e);
            e
        })?;

        tracing::debug!("Bot: {}", reply);

        Ok(ChatResponse { reply })
    }

    /// Clear one session's history, or every session when none is given
    pub async fn clear(&self, session_id: Option<&str>) {
        match session_id {
            Some(id) => self.sessions.clear(id).await,
            None => self.sessions.clear_all().await,
        }
        tracing::info!(session = session_id.unwrap_or("*"), "History cleared");
    }

    /// Call the completion API
    async fn complete(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: self.settings.mode.max_tokens(),
        };

        self.client.complete(&request).await
    }
}
