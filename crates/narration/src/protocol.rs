//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};

// -- Request types --

/// Anthropic messages API request
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    /// Model identifier
    pub model: &'a str,
    /// Maximum tokens to generate (required by Anthropic)
    pub max_tokens: u32,
    /// System prompt (top-level, not in messages)
    pub system: &'a str,
    pub messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

// -- Response types --

/// Anthropic messages API response, reduced to what narration reads
#[derive(Debug, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Content block; non-text blocks carry no `text`
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// Trimmed text of the first content block, if non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .first()
            .and_then(|block| block.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
