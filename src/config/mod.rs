//! Application configuration

pub mod personalities;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

pub use personalities::{Personality, PersonalityError, PersonalityRegistry};

/// Which chat behaviour the server runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Per-request personality, no memory between turns
    Personality,
    /// Fixed prompt with a rolling conversation history
    History,
}

impl ChatMode {
    pub fn max_tokens(&self) -> u32 {
        match self {
            ChatMode::Personality => 200,
            ChatMode::History => 150,
        }
    }

    pub fn keeps_history(&self) -> bool {
        matches!(self, ChatMode::History)
    }
}

impl FromStr for ChatMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personality" => Ok(ChatMode::Personality),
            "history" => Ok(ChatMode::History),
            other => bail!("unknown CHAT_MODE '{}', expected 'personality' or 'history'", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub model: String,
    pub mode: ChatMode,
    pub request_timeout_secs: u64,
    pub history_window: usize,
    pub history_max_stored: usize,
    pub max_sessions: usize,
    pub personalities_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            groq_api_key: None,
            groq_base_url: "https://api.groq.com/openai/v1".into(),
            model: "llama-3.3-70b-versatile".into(),
            mode: ChatMode::Personality,
            request_timeout_secs: 60,
            history_window: 10,
            history_max_stored: 100,
            max_sessions: 1000,
            personalities_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var(&var, "PORT", defaults.port)?,
            groq_api_key: var("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
            groq_base_url: var("GROQ_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.groq_base_url),
            model: var("CHAT_MODEL").unwrap_or(defaults.model),
            mode: match var("CHAT_MODE") {
                Some(mode) => mode.parse()?,
                None => defaults.mode,
            },
            request_timeout_secs: parse_var(
                &var,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            history_window: parse_var(&var, "HISTORY_WINDOW", defaults.history_window)?,
            history_max_stored: parse_var(
                &var,
                "HISTORY_MAX_STORED",
                defaults.history_max_stored,
            )?,
            max_sessions: parse_var(&var, "MAX_SESSIONS", defaults.max_sessions)?,
            personalities_file: var("PERSONALITIES_FILE").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history_window == 0 {
            bail!("HISTORY_WINDOW must be at least 1");
        }
        if self.history_max_stored < self.history_window {
            bail!(
                "HISTORY_MAX_STORED ({}) must be at least HISTORY_WINDOW ({})",
                self.history_max_stored,
                self.history_window
            );
        }
        if self.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be at least 1");
        }
        if self.max_sessions == 0 {
            bail!("MAX_SESSIONS must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Personality prompts, with file overrides applied when configured
    pub fn personality_registry(&self) -> Result<PersonalityRegistry, PersonalityError> {
        match &self.personalities_file {
            Some(path) => PersonalityRegistry::load_from_file(path),
            None => Ok(PersonalityRegistry::builtin()),
        }
    }
}

fn parse_var<F, T>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: '{}'", key, value)),
        None => Ok(default),
    }
}
