//! Speech synthesis behind a single normalized audio result
//!
//! Each configured provider turns text into audio in its own wire format;
//! [`ResponseNormalizer`] folds every answer into [`CanonicalAudio`].

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod normalize;
mod provider;
mod server;
mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use hush_core::{GatewayError, JsonPayload, Result, Transport};
use serde::Deserialize;

pub use normalize::{FieldRule, INLINE_JSON_MIME, ResponseNormalizer};
pub use provider::{SpeechProvider, fish_audio::FishAudioProvider, vapi::VapiProvider};
pub use server::{SpeechService, SpeechServiceBuilder};
pub use types::{
    AudioBody, AudioOptions, CanonicalAudio, DEFAULT_FORMAT, DEFAULT_LANGUAGE, DEFAULT_SPEED, GenerationRequest,
    ProviderStatus, SpeechPayload, VoicesResponse,
};

/// Build the speech service from configuration
pub fn build_service(config: &hush_config::Config, transport: Arc<dyn Transport>) -> anyhow::Result<Arc<SpeechService>> {
    let service = SpeechServiceBuilder::new(config, transport)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to initialize speech service: {e}"))?;

    Ok(Arc::new(service))
}

/// Create the endpoint router for speech
pub fn endpoint_router() -> Router<Arc<SpeechService>> {
    Router::new()
        .route("/api/speech", post(synthesize))
        .route("/api/voices", get(voices))
        .route("/api/providers", get(providers))
}

async fn synthesize(
    State(service): State<Arc<SpeechService>>,
    JsonPayload(payload): JsonPayload<SpeechPayload>,
) -> Result<Json<AudioBody>> {
    let text = payload
        .text
        .ok_or_else(|| GatewayError::invalid_input("text is required (string)"))?;
    let request = GenerationRequest::new(text)?.with_options(payload.options)?;

    let audio = service.synthesize(payload.provider.as_deref(), &request).await?;

    tracing::debug!("speech synthesis complete");

    Ok(Json(audio.into_body()))
}

#[derive(Debug, Deserialize)]
struct VoicesQuery {
    provider: Option<String>,
}

async fn voices(
    State(service): State<Arc<SpeechService>>,
    Query(query): Query<VoicesQuery>,
) -> Result<Json<VoicesResponse>> {
    let (provider, voices) = service.voices(query.provider.as_deref()).await?;

    Ok(Json(VoicesResponse {
        provider,
        count: voices.len(),
        voices,
    }))
}

async fn providers(State(service): State<Arc<SpeechService>>) -> Json<Vec<ProviderStatus>> {
    Json(service.statuses())
}
