#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod pipeline;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use hush_core::{GatewayError, JsonPayload, Result};
use serde::{Deserialize, Serialize};
use speech::{AudioBody, AudioOptions};

pub use pipeline::{Generation, GenerationGateway, Stage};

/// Create the endpoint router for the combined flow
pub fn endpoint_router() -> Router<Arc<GenerationGateway>> {
    Router::new().route("/api/generate", post(generate))
}

#[derive(Debug, Deserialize)]
struct GeneratePayload {
    mood: Option<String>,
    provider: Option<String>,
    #[serde(flatten)]
    options: AudioOptions,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    prompt: String,
    #[serde(flatten)]
    audio: AudioBody,
}

async fn generate(
    State(gateway): State<Arc<GenerationGateway>>,
    JsonPayload(payload): JsonPayload<GeneratePayload>,
) -> Result<Json<GenerateResponse>> {
    let mood = payload.mood.ok_or_else(|| GatewayError::invalid_input("Mood is required"))?;

    let Generation { narration, audio } = gateway
        .run(&mood, payload.provider.as_deref(), payload.options)
        .await?;

    Ok(Json(GenerateResponse {
        model: narration.model,
        prompt: narration.prompt,
        audio: audio.into_body(),
    }))
}
