use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Classification of every way a generation request can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied a malformed or empty request
    InvalidInput,
    /// Provider invoked without a configured credential
    MissingCredential,
    /// Provider answered with a non-success status
    UpstreamError,
    /// Body could not be parsed as its declared content type
    InvalidResponse,
    /// JSON body parsed but none of the known fields matched
    UnexpectedShape,
    /// Body was neither JSON nor audio
    UnexpectedContentType,
    /// Model or voice selection found nothing usable
    NoCandidateFound,
    /// Network failure before a response arrived
    TransportError,
    /// Failure inside the gateway itself
    Internal,
}

/// Terminal failure of a provider call
///
/// Carries the upstream status and detail payload unchanged so callers can
/// tell which provider and which step failed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    /// Upstream HTTP status, 0 when no response was received
    pub status: u16,
    pub message: String,
    /// Name of the provider involved, if any
    pub provider: Option<String>,
    pub detail: Value,
}

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: 0,
            message: message.into(),
            provider: None,
            detail: Value::Null,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingCredential, message)
    }

    pub fn no_candidate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoCandidateFound, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    /// Attribute the failure to a provider unless already attributed
    #[must_use]
    pub fn for_provider(mut self, provider: &str) -> Self {
        self.provider.get_or_insert_with(|| provider.to_owned());
        self
    }

    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamError => StatusCode::from_u16(self.status)
                .ok()
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorKind::InvalidResponse
            | ErrorKind::UnexpectedShape
            | ErrorKind::UnexpectedContentType
            | ErrorKind::TransportError => StatusCode::BAD_GATEWAY,
            ErrorKind::MissingCredential | ErrorKind::NoCandidateFound | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self.kind {
            ErrorKind::Internal => "Internal server error".to_owned(),
            _ => self.message.clone(),
        }
    }
}

/// Error body returned to the UI
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: &'a Value,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::warn!(
                kind = %self.kind,
                provider = self.provider.as_deref().unwrap_or("-"),
                upstream_status = self.status,
                "request failed: {}",
                self.message
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
            kind: self.kind,
            provider: self.provider.as_deref(),
            status: (self.status != 0).then_some(self.status),
            details: &self.detail,
        };

        (status, Json(body)).into_response()
    }
}
