pub mod fish_audio;
pub mod vapi;

use async_trait::async_trait;
use http::Method;
use hush_core::{ModelCandidate, ProviderConfig, Result, Transport};
use serde::Serialize;

use crate::{
    normalize::ResponseNormalizer,
    types::{CanonicalAudio, GenerationRequest, ProviderStatus},
};

/// Trait for speech provider implementations
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `request` and normalize whatever the provider returns
    async fn synthesize(&self, request: &GenerationRequest) -> Result<CanonicalAudio>;

    /// Voices this provider can speak with
    async fn voices(&self) -> Result<Vec<ModelCandidate>>;

    /// Configuration readiness, without secrets
    fn status(&self) -> ProviderStatus;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// POST a JSON body to `url` and normalize the answer
pub(crate) async fn post_and_normalize<T>(
    transport: &dyn Transport,
    provider: &ProviderConfig,
    normalizer: &ResponseNormalizer,
    url: String,
    body: &T,
) -> Result<CanonicalAudio>
where
    T: Serialize + Sync,
{
    let name = provider.name();
    let request = provider
        .request(Method::POST, url)?
        .json(body)
        .map_err(|e| e.for_provider(name))?;

    let response = transport.send(request).await.map_err(|e| e.for_provider(name))?;

    tracing::debug!(
        provider = %name,
        status = response.status,
        content_type = %response.content_type,
        size = response.body.len(),
        "speech provider responded"
    );

    normalizer.normalize(&response).map_err(|e| e.for_provider(name))
}
