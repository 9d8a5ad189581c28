use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppState, SESSION_HEADER};
use crate::errors::AppError;
use crate::models::generation::{self, GenerationRequest};
use crate::models::persona::{compose_prompt, Persona, SAMPLE_INPUT};

const INDEX_HTML: &str = include_str!("../../static/index.html");

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub persona: Persona,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    #[serde(default)]
    pub input: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub prompt: String,
    pub answer: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Serialize)]
pub struct ConnectionResponse {
    pub ok: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct PersonaOption {
    pub id: Persona,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct SliderRange<T> {
    pub min: T,
    pub max: T,
    pub step: T,
    pub default: T,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub warnings: Vec<String>,
    pub model_id: String,
    pub personas: Vec<PersonaOption>,
    pub default_persona: Persona,
    pub max_tokens: SliderRange<u32>,
    pub temperature: SliderRange<f64>,
}

#[derive(Serialize)]
pub struct SampleResponse {
    pub input: &'static str,
}

fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

// ── Handlers ─────────────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        warnings: state.config.warnings(),
        model_id: state.config.model_id.clone(),
        personas: Persona::ALL
            .iter()
            .map(|p| PersonaOption {
                id: *p,
                label: p.label(),
            })
            .collect(),
        default_persona: Persona::default(),
        max_tokens: SliderRange {
            min: generation::MIN_MAX_TOKENS,
            max: generation::MAX_MAX_TOKENS,
            step: generation::MAX_TOKENS_STEP,
            default: generation::DEFAULT_MAX_TOKENS,
        },
        temperature: SliderRange {
            min: generation::MIN_TEMPERATURE,
            max: generation::MAX_TEMPERATURE,
            step: generation::TEMPERATURE_STEP,
            default: generation::DEFAULT_TEMPERATURE,
        },
    })
}

pub async fn sample() -> Json<SampleResponse> {
    Json(SampleResponse {
        input: SAMPLE_INPUT,
    })
}

/// Always answers 200 once the input is present: upstream failures come back
/// as the answer text.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    if req.input.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "please describe your financial situation first".into(),
        ));
    }

    let prompt = compose_prompt(req.persona, &req.input);
    let request = GenerationRequest::new(
        prompt,
        req.max_tokens.unwrap_or(generation::DEFAULT_MAX_TOKENS),
        req.temperature.unwrap_or(generation::DEFAULT_TEMPERATURE),
    );

    let session = state.sessions.get(session_id(&headers));
    let answer = session.lock().await.answer(&request).await;

    Ok(Json(AskResponse {
        prompt: request.prompt,
        answer,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }))
}

pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<ConnectionResponse> {
    let session = state.sessions.get(session_id(&headers));
    let result = session.lock().await.test_connection().await;

    Json(match result {
        Ok(message) => ConnectionResponse { ok: true, message },
        Err(e) => ConnectionResponse {
            ok: false,
            message: e.display_message(),
        },
    })
}
