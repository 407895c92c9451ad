pub mod anthropic;

use async_trait::async_trait;
use hush_core::Result;

/// Prompt sent to a text provider
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

/// Raw text generation outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Model that produced the text
    pub model: String,
    /// Generated text, `None` when the provider returned nothing usable
    pub text: Option<String>,
}

/// Trait for text generation provider implementations
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion>;

    fn name(&self) -> &str;
}
