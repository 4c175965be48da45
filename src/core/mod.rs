//! Core chat components
//!
//! Prompt assembly and the per-turn orchestration that sits between the HTTP
//! routes and the completion API.

mod chat;
mod prompt;

pub use chat::{ChatEngine, ChatError, ChatRequest, ChatResponse, ChatSettings};
