#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod narrator;
mod protocol;
mod provider;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use hush_config::NarrationProviderType;
use hush_core::{GatewayError, JsonPayload, Result, Transport};
use serde::Deserialize;

pub use narrator::{Narration, Narrator};
pub use provider::{Completion, Prompt, TextProvider, anthropic::AnthropicProvider};

/// Build the narrator from configuration
pub fn build_narrator(config: &hush_config::Config, transport: Arc<dyn Transport>) -> anyhow::Result<Arc<Narrator>> {
    let provider: Box<dyn TextProvider> = match config.narration.provider_type {
        NarrationProviderType::Anthropic => Box::new(
            AnthropicProvider::new(&config.narration, transport)
                .map_err(|e| anyhow::anyhow!("Failed to initialize narration provider: {e}"))?,
        ),
    };

    tracing::debug!(provider = %provider.name(), "narration provider initialized");

    Ok(Arc::new(Narrator::new(provider, &config.narration)))
}

/// Create the endpoint router for narration
pub fn endpoint_router() -> Router<Arc<Narrator>> {
    Router::new().route("/api/narration", post(narrate))
}

#[derive(Debug, Deserialize)]
struct NarrationPayload {
    mood: Option<String>,
}

async fn narrate(
    State(narrator): State<Arc<Narrator>>,
    JsonPayload(payload): JsonPayload<NarrationPayload>,
) -> Result<Json<Narration>> {
    let mood = payload.mood.ok_or_else(|| GatewayError::invalid_input("Mood is required"))?;

    Ok(Json(narrator.request_narration(&mood).await?))
}
