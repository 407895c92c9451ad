use std::sync::Arc;

use hush_core::{GatewayError, ModelCandidate, Result};
use narration::{Narration, Narrator};
use speech::{AudioOptions, CanonicalAudio, GenerationRequest, SpeechService};

/// Steps of one generation request, logged as they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Start,
    TextRequested,
    TextReceived,
    AudioRequested,
    Normalized,
    Success,
    Failed,
}

/// Narration together with its spoken audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub narration: Narration,
    pub audio: CanonicalAudio,
}

/// Mood to audio pipeline over a text provider and the speech providers
pub struct GenerationGateway {
    narrator: Arc<Narrator>,
    speech: Arc<SpeechService>,
}

impl GenerationGateway {
    pub fn new(narrator: Arc<Narrator>, speech: Arc<SpeechService>) -> Self {
        Self { narrator, speech }
    }

    pub async fn request_narration(&self, mood: &str) -> Result<Narration> {
        self.narrator.request_narration(mood).await
    }

    pub async fn request_audio(&self, provider: Option<&str>, request: &GenerationRequest) -> Result<CanonicalAudio> {
        self.speech.synthesize(provider, request).await
    }

    pub async fn list_voices(&self, provider: Option<&str>) -> Result<Vec<ModelCandidate>> {
        self.speech.voices(provider).await.map(|(_, voices)| voices)
    }

    /// Run the full flow: mood, narration text, speech, normalized audio
    ///
    /// Stops at the first failure and returns it unchanged. Nothing is
    /// retried.
    pub async fn run(&self, mood: &str, provider: Option<&str>, options: AudioOptions) -> Result<Generation> {
        let result = self.run_stages(mood, provider, options).await;

        match &result {
            Ok(generation) => {
                let inline = matches!(generation.audio, CanonicalAudio::Inline { .. });
                tracing::info!(stage = %Stage::Success, model = %generation.narration.model, inline, "generation complete");
            }
            Err(err) => tracing::warn!(
                stage = %Stage::Failed,
                kind = %err.kind,
                provider = err.provider.as_deref().unwrap_or("-"),
                status = err.status,
                "generation failed: {err}"
            ),
        }

        result
    }

    async fn run_stages(&self, mood: &str, provider: Option<&str>, options: AudioOptions) -> Result<Generation> {
        tracing::debug!(stage = %Stage::Start, "generation started");

        if mood.trim().is_empty() {
            return Err(GatewayError::invalid_input("Mood is required"));
        }
        let speaker = self.speech.provider(provider)?.name().to_owned();
        options.validate()?;

        tracing::debug!(stage = %Stage::TextRequested, provider = %self.narrator.provider_name(), "requesting narration");
        let narration = self.narrator.request_narration(mood).await?;

        tracing::debug!(stage = %Stage::TextReceived, model = %narration.model, chars = narration.prompt.len(), "narration received");
        let request = GenerationRequest::new(narration.prompt.clone())?.with_options(options)?;

        tracing::debug!(stage = %Stage::AudioRequested, provider = %speaker, "requesting audio");
        let audio = self.speech.synthesize(Some(&speaker), &request).await?;

        tracing::debug!(stage = %Stage::Normalized, provider = %speaker, "audio normalized");

        Ok(Generation { narration, audio })
    }
}
