use std::sync::Arc;

use async_trait::async_trait;
use hush_config::SpeechProviderConfig;
use hush_core::{AuthScheme, GatewayError, ModelCandidate, ModelSelector, ProviderConfig, Result, Transport};
use serde::Serialize;
use serde_json::json;

use super::{SpeechProvider, post_and_normalize};
use crate::{
    normalize::ResponseNormalizer,
    types::{CanonicalAudio, GenerationRequest, ProviderStatus},
};

pub const DEFAULT_VAPI_URL: &str = "https://api.vapi.ai";
/// `{agent_id}` is substituted with the configured agent
pub const DEFAULT_SPEAK_PATH: &str = "/v1/agents/{agent_id}/speak";

/// Vapi agent TTS provider
pub struct VapiProvider {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn Transport>,
    agent_id: Option<String>,
    path: String,
    inventory: Option<ModelSelector>,
    normalizer: ResponseNormalizer,
}

#[derive(Serialize)]
struct VapiRequest<'a> {
    text: &'a str,
    format: &'a str,
}

impl VapiProvider {
    pub fn new(name: &str, config: &SpeechProviderConfig, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let base_url = config.base_url.as_ref().map_or(DEFAULT_VAPI_URL, |url| url.as_str());
        let path = config.path.clone().unwrap_or_else(|| DEFAULT_SPEAK_PATH.to_owned());

        let provider = ProviderConfig::new(name, base_url, &path)
            .with_auth(config.api_key.clone(), AuthScheme::Bearer)
            .with_headers(config.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        let provider = Arc::new(provider);

        let inventory = config
            .voices
            .as_ref()
            .map(|voices| ModelSelector::new(transport.clone(), provider.clone(), voices.inventory_path.clone()));

        Ok(Self {
            config: provider,
            transport,
            agent_id: config.agent_id.clone().filter(|id| !id.trim().is_empty()),
            path,
            inventory,
            normalizer: ResponseNormalizer::from_config(&config.response_fields()),
        })
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.agent_id.is_none() {
            missing.push("agent_id");
        }
        if !self.config.has_credential() {
            missing.push("api_key");
        }
        missing
    }
}

#[async_trait]
impl SpeechProvider for VapiProvider {
    async fn synthesize(&self, request: &GenerationRequest) -> Result<CanonicalAudio> {
        let name = self.name();

        let Some(agent_id) = self.agent_id.as_deref().filter(|_| self.config.has_credential()) else {
            return Err(
                GatewayError::missing_credential(format!("provider '{name}' needs both an agent ID and an API key"))
                    .with_detail(json!({
                        "agent_id": self.agent_id.is_some(),
                        "api_key": self.config.has_credential(),
                    }))
                    .for_provider(name),
            );
        };

        tracing::debug!(provider = %name, agent_id = %agent_id, text_len = request.text.len(), "vapi request");

        let url = self.config.url_for(&self.path.replace("{agent_id}", agent_id));
        let body = VapiRequest {
            text: &request.text,
            format: &request.format,
        };

        post_and_normalize(self.transport.as_ref(), &self.config, &self.normalizer, url, &body).await
    }

    async fn voices(&self) -> Result<Vec<ModelCandidate>> {
        match &self.inventory {
            Some(inventory) => inventory.list_candidates().await,
            None => Err(GatewayError::invalid_input(format!(
                "provider '{}' has no voice inventory configured",
                self.name()
            ))
            .for_provider(self.name())),
        }
    }

    fn status(&self) -> ProviderStatus {
        let missing = self.missing();

        ProviderStatus {
            name: self.config.name().to_owned(),
            provider_type: "vapi",
            base_url: self.config.base_url().to_owned(),
            has_credential: self.config.has_credential(),
            ready: missing.is_empty(),
            missing,
        }
    }

    fn name(&self) -> &str {
        self.config.name()
    }
}
