use std::sync::Arc;

use async_trait::async_trait;
use hush_config::{ModelSelectionConfig, SpeechProviderConfig};
use hush_core::{AuthScheme, ModelCandidate, ModelSelector, ProviderConfig, Result, SelectionPolicy, Transport};
use serde::Serialize;

use super::{SpeechProvider, post_and_normalize};
use crate::{
    normalize::ResponseNormalizer,
    types::{CanonicalAudio, GenerationRequest, ProviderStatus},
};

pub const DEFAULT_FISH_AUDIO_URL: &str = "https://api.fish.audio";
pub const DEFAULT_TTS_PATH: &str = "/v1/tts";
pub const DEFAULT_INVENTORY_PATH: &str = "/model";

/// How the reference voice is resolved for each request
#[derive(Debug, Clone)]
enum VoiceChoice {
    Fixed(String),
    Selected(SelectionPolicy),
    /// Let the provider use its own default voice
    Default,
}

/// Fish Audio style TTS provider
pub struct FishAudioProvider {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn Transport>,
    inventory: ModelSelector,
    voice: VoiceChoice,
    normalizer: ResponseNormalizer,
}

#[derive(Serialize)]
struct FishAudioRequest<'a> {
    text: &'a str,
    format: &'a str,
    speed: f64,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_id: Option<&'a str>,
}

impl FishAudioProvider {
    pub fn new(name: &str, config: &SpeechProviderConfig, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let base_url = config
            .base_url
            .as_ref()
            .map_or(DEFAULT_FISH_AUDIO_URL, |url| url.as_str());
        let path = config.path.as_deref().unwrap_or(DEFAULT_TTS_PATH);

        let provider = ProviderConfig::new(name, base_url, path)
            .with_auth(config.api_key.clone(), AuthScheme::Bearer)
            .with_headers(config.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        let provider = Arc::new(provider);

        let inventory_path = config
            .voices
            .as_ref()
            .map_or(DEFAULT_INVENTORY_PATH, |voices| voices.inventory_path.as_str());
        let inventory = ModelSelector::new(transport.clone(), provider.clone(), inventory_path);

        let voice = match (&config.voice, &config.voices) {
            (Some(voice), _) => VoiceChoice::Fixed(voice.clone()),
            (None, Some(voices)) if voices.selects() => VoiceChoice::Selected(selection_policy(name, voices)?),
            _ => VoiceChoice::Default,
        };

        Ok(Self {
            config: provider,
            transport,
            inventory,
            voice,
            normalizer: ResponseNormalizer::from_config(&config.response_fields()),
        })
    }

    async fn resolve_voice(&self) -> Result<Option<String>> {
        match &self.voice {
            VoiceChoice::Fixed(voice) => Ok(Some(voice.clone())),
            VoiceChoice::Selected(policy) => self.inventory.choose_model(policy).await.map(Some),
            VoiceChoice::Default => Ok(None),
        }
    }
}

fn selection_policy(name: &str, voices: &ModelSelectionConfig) -> anyhow::Result<SelectionPolicy> {
    SelectionPolicy::new(voices.preferred.clone(), voices.fallback_pattern.as_deref())
        .map_err(|e| anyhow::anyhow!("invalid voice fallback pattern for provider '{name}': {e}"))
}

#[async_trait]
impl SpeechProvider for FishAudioProvider {
    async fn synthesize(&self, request: &GenerationRequest) -> Result<CanonicalAudio> {
        let voice = self.resolve_voice().await?;

        tracing::debug!(
            provider = %self.name(),
            voice = voice.as_deref().unwrap_or("-"),
            speed = request.speed,
            format = %request.format,
            text_len = request.text.len(),
            "fish audio request"
        );

        let body = FishAudioRequest {
            text: &request.text,
            format: &request.format,
            speed: request.speed,
            language: &request.language,
            model_id: voice.as_deref(),
            reference_id: voice.as_deref(),
        };

        post_and_normalize(
            self.transport.as_ref(),
            &self.config,
            &self.normalizer,
            self.config.endpoint_url(),
            &body,
        )
        .await
    }

    async fn voices(&self) -> Result<Vec<ModelCandidate>> {
        self.inventory.list_candidates().await
    }

    fn status(&self) -> ProviderStatus {
        let has_credential = self.config.has_credential();

        ProviderStatus {
            name: self.config.name().to_owned(),
            provider_type: "fish_audio",
            base_url: self.config.base_url().to_owned(),
            has_credential,
            ready: has_credential,
            missing: if has_credential { Vec::new() } else { vec!["api_key"] },
        }
    }

    fn name(&self) -> &str {
        self.config.name()
    }
}

#[cfg(test)]
mod tests {
    use hush_config::SpeechProviderType;
    use hush_core::{ErrorKind, mock::ScriptedTransport};
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    const VOICE: &str = "4beafc273e80402190a864cbfa961ba0";

    fn config() -> SpeechProviderConfig {
        let mut config = SpeechProviderConfig::new(SpeechProviderType::FishAudio);
        config.api_key = Some(SecretString::from("sk-fish"));
        config
    }

    fn provider(config: &SpeechProviderConfig, transport: &Arc<ScriptedTransport>) -> FishAudioProvider {
        FishAudioProvider::new("fish", config, transport.clone()).unwrap()
    }

    #[tokio::test]
    async fn fixed_voice_is_sent_as_both_ids() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"audioUrl": "https://x/y.mp3"}));

        let mut config = config();
        config.voice = Some(VOICE.to_owned());

        let request = GenerationRequest::new("breathe slowly").unwrap();
        let audio = provider(&config, &transport).synthesize(&request).await.unwrap();

        assert_eq!(
            audio,
            CanonicalAudio::Redirect {
                url: "https://x/y.mp3".to_owned()
            }
        );

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://api.fish.audio/v1/tts");
        assert_eq!(sent[0].headers[http::header::AUTHORIZATION], "Bearer sk-fish");
        assert_eq!(
            sent[0].json_body().unwrap(),
            json!({
                "text": "breathe slowly",
                "format": "mp3",
                "speed": 0.7,
                "language": "en",
                "model_id": VOICE,
                "reference_id": VOICE,
            })
        );
    }

    #[tokio::test]
    async fn voice_is_selected_from_inventory() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!([{"_id": "v2", "title": "Warm"}, {"_id": "v1", "title": "Calm"}]));
        transport.push_raw(200, "audio/mpeg", vec![1_u8, 2, 3]);

        let mut config = config();
        config.voices = Some(ModelSelectionConfig {
            inventory_path: "/model".to_owned(),
            preferred: vec!["v1".to_owned()],
            fallback_pattern: None,
        });

        let request = GenerationRequest::new("hush").unwrap();
        let audio = provider(&config, &transport).synthesize(&request).await.unwrap();

        assert!(matches!(audio, CanonicalAudio::Inline { ref mime_type, .. } if mime_type == "audio/mpeg"));

        let sent = transport.requests();
        assert_eq!(sent[0].url, "https://api.fish.audio/model");
        assert_eq!(sent[1].json_body().unwrap()["reference_id"], "v1");
    }

    #[tokio::test]
    async fn selection_failure_stops_before_synthesis() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!([]));

        let mut config = config();
        config.voices = Some(ModelSelectionConfig {
            inventory_path: "/model".to_owned(),
            preferred: vec!["v1".to_owned()],
            fallback_pattern: None,
        });

        let request = GenerationRequest::new("hush").unwrap();
        let err = provider(&config, &transport).synthesize(&request).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::NoCandidateFound);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn default_voice_omits_ids() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"audio": "QQ=="}));

        let request = GenerationRequest::new("hush").unwrap();
        provider(&config(), &transport).synthesize(&request).await.unwrap();

        let body = transport.requests()[0].json_body().unwrap();
        assert!(body.get("model_id").is_none());
        assert!(body.get("reference_id").is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let config = SpeechProviderConfig::new(SpeechProviderType::FishAudio);

        let request = GenerationRequest::new("hush").unwrap();
        let fish = provider(&config, &transport);
        let err = fish.synthesize(&request).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::MissingCredential);
        assert_eq!(err.provider.as_deref(), Some("fish"));
        assert!(transport.requests().is_empty());
        assert_eq!(fish.status().missing, ["api_key"]);
    }

    #[tokio::test]
    async fn upstream_failure_is_attributed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(402, json!({"message": "insufficient balance"}));

        let request = GenerationRequest::new("hush").unwrap();
        let err = provider(&config(), &transport).synthesize(&request).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.status, 402);
        assert_eq!(err.provider.as_deref(), Some("fish"));
        assert_eq!(err.detail, json!({"message": "insufficient balance"}));
    }

    #[test]
    fn path_and_base_overrides() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut config = config();
        config.base_url = Some("http://localhost:9000/".parse().unwrap());
        config.path = Some("/tts".to_owned());

        let fish = provider(&config, &transport);
        assert_eq!(fish.config.endpoint_url(), "http://localhost:9000/tts");
        assert_eq!(fish.status().base_url, "http://localhost:9000");
        assert!(fish.status().ready);
    }
}
