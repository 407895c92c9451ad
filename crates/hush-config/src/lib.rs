#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod narration;
pub mod selection;
pub mod server;
pub mod speech;
pub mod telemetry;
pub mod upstream;

use serde::Deserialize;

pub use cors::*;
pub use env::ExpandError;
pub use health::*;
pub use narration::*;
pub use selection::*;
pub use server::*;
pub use speech::*;
pub use telemetry::*;
pub use upstream::*;

/// Top-level Hush configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Settings shared by every upstream call
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Text generation provider
    #[serde(default)]
    pub narration: NarrationConfig,
    /// Speech synthesis providers
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
