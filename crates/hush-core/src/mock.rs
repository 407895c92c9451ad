//! Scripted in-memory transport for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::{
    error::{GatewayError, Result},
    transport::{OutboundRequest, RawResponse, Transport},
};

/// Replays queued responses in order and records every request
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_raw(status, "application/json", body.to_string());
    }

    pub fn push_raw(&self, status: u16, content_type: &str, body: impl Into<Bytes>) {
        self.push(Ok(RawResponse::new(status, content_type, body)));
    }

    pub fn push_error(&self, error: GatewayError) {
        self.push(Err(error));
    }

    fn push(&self, response: Result<RawResponse>) {
        self.responses.lock().expect("transport lock poisoned").push_back(response);
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().expect("transport lock poisoned").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse> {
        let url = request.url.clone();
        self.requests.lock().expect("transport lock poisoned").push(request);

        self.responses
            .lock()
            .expect("transport lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::transport(format!("no scripted response for {url}"))))
    }
}
