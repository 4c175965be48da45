//! Conversation types and state management

mod sessions;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub use sessions::{SessionStore, DEFAULT_SESSION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered message history for a single conversation.
///
/// Writes never fail. Once `max_stored` messages are held, every append
/// evicts the oldest message so an always-on process keeps bounded memory.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    messages: VecDeque<Message>,
    max_stored: usize,
}

impl ConversationStore {
    pub fn new(max_stored: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_stored: max_stored.max(1),
        }
    }

    /// Add a message to the end of the history
    pub fn append(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_stored {
            self.messages.pop_front();
        }
    }

    /// The last `n` messages in their original order
    pub fn windowed(&self, n: usize) -> Vec<Message> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}
