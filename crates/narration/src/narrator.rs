use hush_config::NarrationConfig;
use hush_core::{GatewayError, Result};
use serde::Serialize;

use crate::provider::{Prompt, TextProvider};

/// Generated bedtime script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narration {
    pub model: String,
    /// Text to be read aloud
    pub prompt: String,
}

/// Turns a mood into a narration through a text provider
pub struct Narrator {
    provider: Box<dyn TextProvider>,
    system_prompt: String,
    user_template: String,
    max_tokens: u32,
    fallback_text: String,
}

impl Narrator {
    pub fn new(provider: Box<dyn TextProvider>, config: &NarrationConfig) -> Self {
        Self {
            provider,
            system_prompt: config.system_prompt.clone(),
            user_template: config.user_template.clone(),
            max_tokens: config.max_tokens,
            fallback_text: config.fallback_text.clone(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate narration text for `mood`
    ///
    /// Empty provider output is replaced by the configured fallback sentence;
    /// every other failure is returned as is.
    pub async fn request_narration(&self, mood: &str) -> Result<Narration> {
        let mood = mood.trim();
        if mood.is_empty() {
            return Err(GatewayError::invalid_input("Mood is required"));
        }

        let prompt = Prompt {
            system: self.system_prompt.clone(),
            user: self.user_template.replace("{mood}", mood),
            max_tokens: self.max_tokens,
        };

        let completion = self.provider.generate(&prompt).await?;

        let prompt = completion.text.unwrap_or_else(|| {
            tracing::debug!(provider = %self.provider.name(), model = %completion.model, "empty narration, using fallback");
            self.fallback_text.clone()
        });

        Ok(Narration {
            model: completion.model,
            prompt,
        })
    }
}
