//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use hush_config::{
    Config, CorsConfig, HealthConfig, ModelSelectionConfig, ServerConfig, SpeechProviderConfig, SpeechProviderType,
};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Point narration at a mock Anthropic backend, selecting the model from its inventory
    pub fn with_narration(mut self, base_url: &str) -> Self {
        self.config.narration.api_key = Some(SecretString::from("test-anthropic-key"));
        self.config.narration.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Add a Fish Audio provider with a fixed voice
    pub fn with_fish_audio(mut self, name: &str, base_url: &str) -> Self {
        let mut provider = SpeechProviderConfig::new(SpeechProviderType::FishAudio);
        provider.api_key = Some(SecretString::from("test-fish-key"));
        provider.base_url = Some(base_url.parse().expect("valid URL"));
        provider.voice = Some("4beafc273e80402190a864cbfa961ba0".to_owned());
        provider.voices = Some(ModelSelectionConfig {
            inventory_path: "/model".to_owned(),
            preferred: Vec::new(),
            fallback_pattern: None,
        });

        self.config.speech.providers.insert(name.to_owned(), provider);
        self
    }

    /// Add a Vapi provider; `None` leaves the setting unconfigured
    pub fn with_vapi(mut self, name: &str, base_url: &str, agent_id: Option<&str>, api_key: Option<&str>) -> Self {
        let mut provider = SpeechProviderConfig::new(SpeechProviderType::Vapi);
        provider.api_key = api_key.map(SecretString::from);
        provider.agent_id = agent_id.map(str::to_owned);
        provider.base_url = Some(base_url.parse().expect("valid URL"));

        self.config.speech.providers.insert(name.to_owned(), provider);
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
