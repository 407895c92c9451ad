//! Mock provider backend for integration tests
//!
//! Serves the Anthropic, Fish Audio and Vapi endpoints Hush calls, with
//! replies that tests can change while the server runs.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// What the text endpoint answers
#[derive(Debug, Clone)]
pub enum NarrationReply {
    Text(String),
    /// Success with no content blocks
    Empty,
    Error(u16, Value),
}

/// What the speech endpoints answer
#[derive(Debug, Clone)]
pub enum SpeechReply {
    Json(u16, Value),
    Raw(u16, &'static str, Vec<u8>),
}

/// Last speech request received
#[derive(Debug, Clone)]
pub struct RecordedSpeech {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Mock backend that returns scripted responses
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    models_count: AtomicU32,
    messages_count: AtomicU32,
    speech_count: AtomicU32,
    narration: Mutex<NarrationReply>,
    speech: Mutex<SpeechReply>,
    last_speech: Mutex<Option<RecordedSpeech>>,
}

impl MockUpstream {
    /// Start the mock server with a narration text and a redirect audio reply
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            models_count: AtomicU32::new(0),
            messages_count: AtomicU32::new(0),
            speech_count: AtomicU32::new(0),
            narration: Mutex::new(NarrationReply::Text("Let your eyes flutter shut...".to_owned())),
            speech: Mutex::new(SpeechReply::Json(200, json!({"audioUrl": "https://cdn.mock/hush.mp3"}))),
            last_speech: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/models", routing::get(handle_models))
            .route("/v1/messages", routing::post(handle_messages))
            .route("/model", routing::get(handle_voices))
            .route("/v1/tts", routing::post(handle_tts))
            .route("/v1/agents/{agent_id}/speak", routing::post(handle_agent_speak))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_narration(&self, reply: NarrationReply) {
        *self.state.narration.lock().unwrap() = reply;
    }

    pub fn set_speech(&self, reply: SpeechReply) {
        *self.state.speech.lock().unwrap() = reply;
    }

    pub fn models_count(&self) -> u32 {
        self.state.models_count.load(Ordering::Relaxed)
    }

    pub fn messages_count(&self) -> u32 {
        self.state.messages_count.load(Ordering::Relaxed)
    }

    pub fn speech_count(&self) -> u32 {
        self.state.speech_count.load(Ordering::Relaxed)
    }

    pub fn last_speech(&self) -> Option<RecordedSpeech> {
        self.state.last_speech.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn has_anthropic_headers(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").is_some() && headers.get("anthropic-version").is_some()
}

async fn handle_models(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.models_count.fetch_add(1, Ordering::Relaxed);

    if !has_anthropic_headers(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"type": "authentication_error"}}))).into_response();
    }

    Json(json!({
        "data": [
            {"id": "claude-2.1", "type": "model"},
            {"id": "claude-3-haiku-20240307", "type": "model"},
        ]
    }))
    .into_response()
}

async fn handle_messages(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.messages_count.fetch_add(1, Ordering::Relaxed);

    if !has_anthropic_headers(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"type": "authentication_error"}}))).into_response();
    }

    let reply = state.narration.lock().unwrap().clone();
    match reply {
        NarrationReply::Text(text) => Json(json!({
            "id": "msg_mock",
            "type": "message",
            "model": body["model"],
            "content": [{"type": "text", "text": text}],
        }))
        .into_response(),
        NarrationReply::Empty => Json(json!({"id": "msg_mock", "content": []})).into_response(),
        NarrationReply::Error(status, body) => {
            (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
        }
    }
}

async fn handle_voices() -> Json<Value> {
    Json(json!([
        {"_id": "4beafc273e80402190a864cbfa961ba0", "title": "Whisper", "tags": ["asmr", "soft"]},
        {"_id": "7f92f8afb8ec43bf81429cc1c9199cb1", "title": "Calm Narrator"},
    ]))
}

async fn handle_tts(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    speech_reply(&state, "/v1/tts".to_owned(), &headers, body)
}

async fn handle_agent_speak(
    State(state): State<Arc<MockState>>,
    Path(agent_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    speech_reply(&state, format!("/v1/agents/{agent_id}/speak"), &headers, body)
}

fn speech_reply(state: &MockState, path: String, headers: &HeaderMap, body: Value) -> Response {
    state.speech_count.fetch_add(1, Ordering::Relaxed);

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    *state.last_speech.lock().unwrap() = Some(RecordedSpeech {
        path,
        authorization,
        body,
    });

    let reply = state.speech.lock().unwrap().clone();
    match reply {
        SpeechReply::Json(status, body) => (StatusCode::from_u16(status).unwrap(), Json(body)).into_response(),
        SpeechReply::Raw(status, content_type, body) => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, content_type)],
            body,
        )
            .into_response(),
    }
}
