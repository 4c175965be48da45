//! Per-session conversation state
//!
//! Each session owns its own [`ConversationStore`] behind an async mutex. The
//! chat engine holds that mutex for a whole turn, so turns within a session
//! never interleave while separate sessions proceed independently.
//!
//! Eviction only removes idle sessions: a conversation that a turn still holds
//! stays in the map, and the shared default session is never evicted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::ConversationStore;

/// Session used when a request carries no session id
pub const DEFAULT_SESSION: &str = "default";

struct SessionEntry {
    conversation: Arc<Mutex<ConversationStore>>,
    last_active: DateTime<Utc>,
}

impl SessionEntry {
    /// Nobody outside the map references or locks the conversation
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.conversation) == 1 && self.conversation.try_lock().is_ok()
    }
}

/// Registry of live conversations keyed by session id
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    max_sessions: usize,
    max_stored: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize, max_stored: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            max_stored,
        }
    }

    /// Get the conversation for a session, creating it if needed
    pub async fn conversation(&self, session_id: &str) -> Arc<Mutex<ConversationStore>> {
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();

        if let Some(entry) = sessions.get_mut(session_id) {
            entry.last_active = now;
            return entry.conversation.clone();
        }

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(id, entry)| id.as_str() != DEFAULT_SESSION && entry.is_idle())
                .min_by_key(|(_, entry)| entry.last_active)
                .map(|(id, _)| id.clone());

            match oldest {
                Some(oldest) => {
                    tracing::debug!(session = %oldest, "Evicting least recently active session");
                    sessions.remove(&oldest);
                }
                None => {
                    tracing::warn!(
                        sessions = sessions.len(),
                        "Session limit reached but every session is busy"
                    );
                }
            }
        }

        let conversation = Arc::new(Mutex::new(ConversationStore::new(self.max_stored)));
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                conversation: conversation.clone(),
                last_active: now,
            },
        );
        conversation
    }

    /// Clear one session's history. Unknown sessions are a no-op.
    pub async fn clear(&self, session_id: &str) {
        let conversation = {
            let sessions = self.sessions.lock().await;
            sessions.get(session_id).map(|e| e.conversation.clone())
        };

        if let Some(conversation) = conversation {
            conversation.lock().await.clear();
        }
    }

    /// Clear every session's history
    pub async fn clear_all(&self) {
        let conversations: Vec<_> = {
            let sessions = self.sessions.lock().await;
            sessions.values().map(|e| e.conversation.clone()).collect()
        };

        for conversation in conversations {
            conversation.lock().await.clear();
        }
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
