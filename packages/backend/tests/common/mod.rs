#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use polypath_backend::config::{Config, ValidationPolicy};
use polypath_backend::services::llm_provider::{CompletionClient, LLMError};
use polypath_backend::state::AppState;

#[derive(Clone)]
pub enum Upstream {
    Reply(String),
    Status(u16, String),
    Unconfigured,
}

/// Stand-in for the language-model service that records what it was asked.
pub struct FakeCompletion {
    upstream: Upstream,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeCompletion {
    pub fn new(upstream: Upstream) -> Arc<Self> {
        Arc::new(Self {
            upstream,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Self::new(Upstream::Reply(reply.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(user.to_string());

        match &self.upstream {
            Upstream::Reply(reply) => Ok(reply.clone()),
            Upstream::Status(code, body) => Err(LLMError::HttpStatus {
                status: reqwest::StatusCode::from_u16(*code).unwrap(),
                body: body.clone(),
            }),
            Upstream::Unconfigured => Err(LLMError::NotConfigured("OPENAI_API_KEY")),
        }
    }

    fn is_configured(&self) -> bool {
        !matches!(self.upstream, Upstream::Unconfigured)
    }
}

pub fn create_test_app(fake: Arc<FakeCompletion>) -> Router {
    create_test_app_with_policy(fake, ValidationPolicy::Lenient)
}

pub fn create_test_app_with_policy(fake: Arc<FakeCompletion>, policy: ValidationPolicy) -> Router {
    let mut config = Config::default();
    config.words.policy = policy;
    polypath_backend::create_app_with_state(AppState::new(config, fake))
}

pub fn words_reply(pairs: &[(&str, &str)]) -> String {
    let words: Vec<Value> = pairs
        .iter()
        .map(|(native, target)| serde_json::json!({ "native": native, "target": target }))
        .collect();
    serde_json::json!({ "words": words }).to_string()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
