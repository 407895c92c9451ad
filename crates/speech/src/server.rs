use std::sync::Arc;

use hush_config::SpeechProviderType;
use hush_core::{GatewayError, ModelCandidate, Result, Transport};

use crate::{
    provider::{SpeechProvider, fish_audio::FishAudioProvider, vapi::VapiProvider},
    types::{CanonicalAudio, GenerationRequest, ProviderStatus},
};

/// Routes speech requests to the configured providers
pub struct SpeechService {
    providers: Vec<Box<dyn SpeechProvider>>,
}

impl SpeechService {
    /// Service over an explicit provider list; the first one is the default
    pub fn from_providers(providers: Vec<Box<dyn SpeechProvider>>) -> Self {
        Self { providers }
    }

    /// Look up a provider by name, or the first configured one
    pub fn provider(&self, name: Option<&str>) -> Result<&dyn SpeechProvider> {
        let provider = match name.filter(|name| !name.is_empty()) {
            Some(name) => self
                .providers
                .iter()
                .find(|provider| provider.name() == name)
                .ok_or_else(|| GatewayError::invalid_input(format!("unknown speech provider '{name}'")))?,
            None => self
                .providers
                .first()
                .ok_or_else(|| GatewayError::missing_credential("no speech providers configured"))?,
        };

        Ok(provider.as_ref())
    }

    pub async fn synthesize(&self, provider: Option<&str>, request: &GenerationRequest) -> Result<CanonicalAudio> {
        let provider = self.provider(provider)?;
        tracing::debug!(provider = %provider.name(), "synthesizing speech");

        provider.synthesize(request).await
    }

    pub async fn voices(&self, provider: Option<&str>) -> Result<(String, Vec<ModelCandidate>)> {
        let provider = self.provider(provider)?;
        let voices = provider.voices().await?;

        Ok((provider.name().to_owned(), voices))
    }

    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.providers.iter().map(|provider| provider.status()).collect()
    }
}

/// Builder for constructing the speech service from configuration
pub struct SpeechServiceBuilder<'a> {
    config: &'a hush_config::Config,
    transport: Arc<dyn Transport>,
}

impl<'a> SpeechServiceBuilder<'a> {
    pub fn new(config: &'a hush_config::Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn build(self) -> anyhow::Result<SpeechService> {
        let mut providers: Vec<Box<dyn SpeechProvider>> = Vec::new();

        for (name, provider_config) in &self.config.speech.providers {
            tracing::debug!(provider = %name, kind = ?provider_config.provider_type, "initializing speech provider");

            let provider: Box<dyn SpeechProvider> = match provider_config.provider_type {
                SpeechProviderType::FishAudio => {
                    Box::new(FishAudioProvider::new(name, provider_config, self.transport.clone())?)
                }
                SpeechProviderType::Vapi => Box::new(VapiProvider::new(name, provider_config, self.transport.clone())?),
            };

            providers.push(provider);
        }

        if providers.is_empty() {
            tracing::debug!("no speech providers configured");
        } else {
            tracing::debug!("speech service initialized with {} provider(s)", providers.len());
        }

        Ok(SpeechService::from_providers(providers))
    }
}
