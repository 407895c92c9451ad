//! Shared building blocks for talking to generation providers
//!
//! Provider description, the HTTP transport seam, the error taxonomy every
//! provider failure is mapped into, and inventory based model selection.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod payload;
mod provider;
mod selector;
mod transport;

pub use error::{ErrorKind, GatewayError, Result};
pub use payload::JsonPayload;
pub use provider::{AuthScheme, ProviderConfig, join_url};
pub use selector::{ModelCandidate, ModelSelector, SelectionPolicy, parse_inventory};
pub use transport::{BODY_PREFIX_CHARS, HttpTransport, OutboundRequest, RawResponse, Transport};
