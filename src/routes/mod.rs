//! API routes

mod error;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ChatMode, Personality};
use crate::core::{ChatRequest, ChatResponse};
use crate::AppState;

pub use error::ApiError;

const INDEX: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    mode: ChatMode,
    model: String,
}

#[derive(Debug, Serialize)]
struct PersonalitiesResponse {
    personalities: Vec<&'static str>,
    default: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    message: &'static str,
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        mode: state.chat_engine.mode(),
        model: state.config.model.clone(),
    })
}

async fn personalities(State(state): State<AppState>) -> Json<PersonalitiesResponse> {
    Json(PersonalitiesResponse {
        personalities: state.chat_engine.personalities().keys(),
        default: Personality::DEFAULT.key(),
    })
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let span = tracing::info_span!("chat", request_id = %Uuid::new_v4());
    let response = state.chat_engine.chat(request).instrument(span).await?;

    Ok(Json(response))
}

async fn clear(
    State(state): State<AppState>,
    payload: Option<Json<ClearRequest>>,
) -> Json<ClearResponse> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    state.chat_engine.clear(request.session_id.as_deref()).await;

    Json(ClearResponse {
        message: "History cleared",
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/personalities", get(personalities))
        .route("/chat", post(chat))
        .route("/clear", post(clear))
}
