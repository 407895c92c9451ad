//! Anthropic Messages API provider implementation

use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderName, Method};
use hush_config::NarrationConfig;
use hush_core::{
    AuthScheme, ErrorKind, GatewayError, ModelSelector, ProviderConfig, Result, SelectionPolicy, Transport,
};
use serde_json::Value;

use super::{Completion, Prompt, TextProvider};
use crate::protocol::{Message, MessagesRequest, MessagesResponse};

/// Default Anthropic API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

const PROVIDER_NAME: &str = "anthropic";

/// How the model is chosen for each request
enum ModelChoice {
    Fixed(String),
    Selected {
        selector: ModelSelector,
        policy: SelectionPolicy,
    },
    Unconfigured,
}

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn Transport>,
    model: ModelChoice,
}

impl AnthropicProvider {
    /// Create from narration configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header or the fallback pattern is invalid
    pub fn new(config: &NarrationConfig, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let base_url = config.base_url.as_ref().map_or(DEFAULT_BASE_URL, |url| url.as_str());

        let provider = ProviderConfig::new(PROVIDER_NAME, base_url, &config.path)
            .with_auth(
                config.api_key.clone(),
                AuthScheme::Header(HeaderName::from_static("x-api-key")),
            )
            .with_headers([("anthropic-version", ANTHROPIC_VERSION)])?
            .with_headers(config.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        let provider = Arc::new(provider);

        let model = match (&config.model, &config.models) {
            (Some(model), _) => ModelChoice::Fixed(model.clone()),
            (None, Some(models)) if models.selects() => {
                let policy = SelectionPolicy::new(models.preferred.clone(), models.fallback_pattern.as_deref())
                    .map_err(|e| anyhow::anyhow!("invalid narration model fallback pattern: {e}"))?;

                ModelChoice::Selected {
                    selector: ModelSelector::new(transport.clone(), provider.clone(), models.inventory_path.clone()),
                    policy,
                }
            }
            _ => ModelChoice::Unconfigured,
        };

        Ok(Self {
            config: provider,
            transport,
            model,
        })
    }

    async fn resolve_model(&self) -> Result<String> {
        match &self.model {
            ModelChoice::Fixed(model) => Ok(model.clone()),
            ModelChoice::Selected { selector, policy } => selector.choose_model(policy).await,
            ModelChoice::Unconfigured => Err(GatewayError::no_candidate(
                "narration has neither a fixed model nor a model selection policy",
            )
            .for_provider(PROVIDER_NAME)),
        }
    }
}

#[async_trait]
impl TextProvider for AnthropicProvider {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion> {
        let model = self.resolve_model().await?;

        let body = MessagesRequest {
            model: &model,
            max_tokens: prompt.max_tokens,
            system: &prompt.system,
            messages: [Message {
                role: "user",
                content: &prompt.user,
            }],
        };

        let request = self
            .config
            .request(Method::POST, self.config.endpoint_url())?
            .json(&body)?;

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| e.for_provider(PROVIDER_NAME))?;

        if !response.is_success() {
            tracing::warn!(provider = PROVIDER_NAME, status = response.status, "upstream returned error");

            return Err(GatewayError::new(
                ErrorKind::UpstreamError,
                format!("text provider returned status {}", response.status),
            )
            .with_status(response.status)
            .with_detail(response.detail())
            .for_provider(PROVIDER_NAME));
        }

        let parsed: MessagesResponse = serde_json::from_slice(&response.body).map_err(|e| {
            GatewayError::new(ErrorKind::InvalidResponse, format!("failed to parse response: {e}"))
                .with_status(response.status)
                .with_detail(Value::String(response.body_prefix()))
                .for_provider(PROVIDER_NAME)
        })?;

        let text = parsed.first_text().map(str::to_owned);
        tracing::debug!(provider = PROVIDER_NAME, %model, has_text = text.is_some(), "text generated");

        Ok(Completion { model, text })
    }

    fn name(&self) -> &str {
        self.config.name()
    }
}
