//! Personality presets and their system prompts
//!
//! The set of personalities is closed. Prompt texts ship built in and can be
//! overridden from a TOML file; a file may only override known keys, so the
//! registry always holds a prompt for every personality.
//!
//! # Example Personalities File
//!
//! ```toml
//! [personalities]
//! professional = "You are a formal assistant for a law firm."
//! concise = """
//! Answer in one sentence.
//! """
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// A named system-prompt preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Personality {
    Helpful,
    Professional,
    Casual,
    Creative,
    Concise,
}

impl Personality {
    /// Every personality, in display order
    pub const ALL: [Personality; 5] = [
        Personality::Helpful,
        Personality::Professional,
        Personality::Casual,
        Personality::Creative,
        Personality::Concise,
    ];

    /// Fallback for missing or unknown keys
    pub const DEFAULT: Personality = Personality::Helpful;

    pub fn key(&self) -> &'static str {
        match self {
            Personality::Helpful => "helpful",
            Personality::Professional => "professional",
            Personality::Casual => "casual",
            Personality::Creative => "creative",
            Personality::Concise => "concise",
        }
    }

    /// Exact, case-sensitive lookup
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    fn builtin_prompt(&self) -> &'static str {
        match self {
            Personality::Helpful => builtin::HELPFUL,
            Personality::Professional => builtin::PROFESSIONAL,
            Personality::Casual => builtin::CASUAL,
            Personality::Creative => builtin::CREATIVE,
            Personality::Concise => builtin::CONCISE,
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// On-disk override format
#[derive(Debug, Deserialize)]
struct PersonalitiesFile {
    #[serde(default)]
    personalities: HashMap<String, String>,
}

/// Lookup table from personality to system prompt
#[derive(Debug, Clone)]
pub struct PersonalityRegistry {
    prompts: HashMap<Personality, String>,
}

impl Default for PersonalityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PersonalityRegistry {
    /// Registry with the built-in prompt for every personality
    pub fn builtin() -> Self {
        let prompts = Personality::ALL
            .into_iter()
            .map(|p| (p, p.builtin_prompt().to_string()))
            .collect();
        Self { prompts }
    }

    /// Built-in prompts overridden by the entries of a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, PersonalityError> {
        let file: PersonalitiesFile =
            toml::from_str(content).map_err(|e| PersonalityError::ParseError(e.to_string()))?;

        let mut registry = Self::builtin();
        for (key, prompt) in file.personalities {
            let personality = Personality::from_key(&key)
                .ok_or_else(|| PersonalityError::UnknownPersonality(key.clone()))?;

            let prompt = prompt.trim();
            if prompt.is_empty() {
                return Err(PersonalityError::EmptyPrompt(key));
            }
            registry.prompts.insert(personality, prompt.to_string());
        }

        registry.validate()?;
        Ok(registry)
    }

    /// Load overrides from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, PersonalityError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PersonalityError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Check that every personality has a prompt
    pub fn validate(&self) -> Result<(), PersonalityError> {
        for personality in Personality::ALL {
            match self.prompts.get(&personality) {
                Some(prompt) if !prompt.trim().is_empty() => {}
                _ => return Err(PersonalityError::EmptyPrompt(personality.key().to_string())),
            }
        }
        Ok(())
    }

    /// Prompt for a personality
    pub fn prompt(&self, personality: Personality) -> &str {
        self.prompts
            .get(&personality)
            .map(String::as_str)
            .unwrap_or_else(|| personality.builtin_prompt())
    }

    /// Resolve a requested key; anything missing or unknown gets the default prompt
    pub fn resolve(&self, key: Option<&str>) -> &str {
        let personality = key
            .and_then(Personality::from_key)
            .unwrap_or(Personality::DEFAULT);
        self.prompt(personality)
    }

    /// Keys of all personalities, in display order
    pub fn keys(&self) -> Vec<&'static str> {
        Personality::ALL.iter().map(Personality::key).collect()
    }
}

/// Errors from personality loading
#[derive(Debug, thiserror::Error)]
pub enum PersonalityError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    #[error("Empty prompt for personality: {0}")]
    EmptyPrompt(String),
}

/// Built-in prompts that don't require files
pub mod builtin {
    pub const HELPFUL: &str =
        "You are a helpful, friendly AI assistant. Keep responses concise and helpful.";

    pub const PROFESSIONAL: &str = "You are a professional AI assistant. Be formal, precise, and business-like in your responses.";

    pub const CASUAL: &str = "You are a casual and friendly AI assistant. Be relaxed, use conversational language, and feel free to use emojis occasionally.";

    pub const CREATIVE: &str = "You are a creative AI assistant. Be imaginative, think outside the box, and provide unique perspectives.";

    pub const CONCISE: &str = "You are a concise AI assistant. Give brief, to-the-point answers. Keep responses under 50 words when possible.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_complete() {
        let registry = PersonalityRegistry::builtin();
        assert!(registry.validate().is_ok());
        assert_eq!(
            registry.keys(),
            vec!["helpful", "professional", "casual", "creative", "concise"]
        );
        assert_eq!(registry.prompt(Personality::Concise), builtin::CONCISE);
    }

    #[test]
    fn test_unknown_key_falls_back_to_helpful() {
        let registry = PersonalityRegistry::builtin();

        assert_eq!(registry.resolve(Some("pirate")), builtin::HELPFUL);
        assert_eq!(registry.resolve(None), builtin::HELPFUL);
        assert_eq!(registry.resolve(Some("")), builtin::HELPFUL);
        // no partial or case-insensitive matching
        assert_eq!(registry.resolve(Some("Casual")), builtin::HELPFUL);
        assert_eq!(registry.resolve(Some("creat")), builtin::HELPFUL);
        assert_eq!(registry.resolve(Some("casual")), builtin::CASUAL);
    }

    #[test]
    fn test_parse_overrides() {
        let toml_content = r#"
[personalities]
professional = "You are a formal assistant."
concise = """
One sentence only.
"""
"#;

        let registry = PersonalityRegistry::from_toml_str(toml_content).unwrap();
        assert_eq!(
            registry.prompt(Personality::Professional),
            "You are a formal assistant."
        );
        assert_eq!(registry.prompt(Personality::Concise), "One sentence only.");
        // untouched keys keep the built-in text
        assert_eq!(registry.prompt(Personality::Helpful), builtin::HELPFUL);
    }

    #[test]
    fn test_empty_file_is_builtin() {
        let registry = PersonalityRegistry::from_toml_str("").unwrap();
        assert_eq!(registry.prompt(Personality::Creative), builtin::CREATIVE);
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = PersonalityRegistry::from_toml_str(
            r#"
[personalities]
pirate = "Arr."
"#,
        )
        .unwrap_err();
        assert!(matches!(err, PersonalityError::UnknownPersonality(k) if k == "pirate"));
    }

    #[test]
    fn test_rejects_empty_prompt() {
        let err = PersonalityRegistry::from_toml_str(
            r#"
[personalities]
casual = "   "
"#,
        )
        .unwrap_err();
        assert!(matches!(err, PersonalityError::EmptyPrompt(k) if k == "casual"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = PersonalityRegistry::from_toml_str("[personalities\n").unwrap_err();
        assert!(matches!(err, PersonalityError::ParseError(_)));
    }
}
