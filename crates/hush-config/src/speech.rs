use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::selection::{ModelSelectionConfig, ResponseFieldsConfig};

/// Speech synthesis configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// Speech providers keyed by name; the first one is the default
    #[serde(default)]
    pub providers: IndexMap<String, SpeechProviderConfig>,
}

/// Configuration for a single speech provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechProviderConfig {
    /// Request shape spoken by the provider
    #[serde(rename = "type")]
    pub provider_type: SpeechProviderType,
    /// API key, only required once the provider is invoked
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Synthesis endpoint path override
    #[serde(default)]
    pub path: Option<String>,
    /// Fixed voice (reference model) ID
    #[serde(default)]
    pub voice: Option<String>,
    /// Agent ID for agent-scoped providers
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Voice inventory and selection
    #[serde(default)]
    pub voices: Option<ModelSelectionConfig>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Override of the JSON fields searched for audio
    #[serde(default)]
    pub response: Option<ResponseFieldsConfig>,
}

impl SpeechProviderConfig {
    /// Minimal configuration for the given provider type
    pub fn new(provider_type: SpeechProviderType) -> Self {
        Self {
            provider_type,
            api_key: None,
            base_url: None,
            path: None,
            voice: None,
            agent_id: None,
            voices: None,
            headers: IndexMap::new(),
            response: None,
        }
    }

    /// Field table in effect for this provider
    pub fn response_fields(&self) -> ResponseFieldsConfig {
        self.response.clone().unwrap_or_else(|| match self.provider_type {
            SpeechProviderType::FishAudio => ResponseFieldsConfig::fish_audio(),
            SpeechProviderType::Vapi => ResponseFieldsConfig::vapi(),
        })
    }
}

/// Supported speech request shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechProviderType {
    /// Fish Audio style `POST /v1/tts` with a reference voice
    FishAudio,
    /// Vapi style `POST /v1/agents/{agent_id}/speak`
    Vapi,
}
