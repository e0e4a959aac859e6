use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::{GenerateRequest, GenerateResponse};

/// Path of the generation endpoint, joined onto the site's base URL.
pub const GENERATE_PATH: &str = "/generate-words";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    Api(String),
    #[error("No words received from the server")]
    NoWords,
    #[error("Invalid response from the server: {0}")]
    Decode(String),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Invalid endpoint {url}: {reason}")]
    Endpoint { url: String, reason: String },
}

/// Transport used by the controller to reach the word-generation endpoint.
#[async_trait(?Send)]
pub trait WordsApi {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, FetchError>;
}

/// Turns a raw HTTP exchange into words or an error.
///
/// Non-success statuses prefer the body's `error` field over the raw text;
/// a success body carrying `error`, or lacking a non-empty `words` array, is
/// still a failure.
pub fn interpret_response(status: u16, body: &str) -> Result<GenerateResponse, FetchError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error_field = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if !(200..300).contains(&status) {
        return Err(FetchError::Server {
            status,
            message: error_field.unwrap_or_else(|| body.trim().to_string()),
        });
    }

    if let Some(message) = error_field {
        return Err(FetchError::Api(message));
    }

    let Some(value) = parsed else {
        return Err(FetchError::Decode("body is not JSON".to_string()));
    };

    match value.get("words") {
        Some(Value::Array(items)) if !items.is_empty() => {
            serde_json::from_value::<GenerateResponse>(value)
                .map_err(|e| FetchError::Decode(e.to_string()))
        }
        _ => Err(FetchError::NoWords),
    }
}

#[derive(Clone, Debug)]
pub struct HttpWordsApi {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpWordsApi {
    /// `base_url` must be absolute (in the browser, `window.location.origin`);
    /// reqwest rejects relative URLs on every target.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH);
        let endpoint = reqwest::Url::parse(&url).map_err(|e| FetchError::Endpoint {
            url,
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait(?Send)]
impl WordsApi for HttpWordsApi {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, FetchError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        interpret_response(status, &body)
    }
}
