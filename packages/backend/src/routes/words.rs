use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::Instrument;
use uuid::Uuid;

use crate::response::AppError;
use crate::services::llm_provider::LLMError;
use crate::services::word_generation::{
    self, GenerateError, GenerateWordsRequest, GenerateWordsResponse, ReplyError,
};
use crate::state::AppState;

pub async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate_words", %request_id);

    async move {
        match handle_generate(&state, &body).await {
            Ok(response) => (StatusCode::OK, Json(response)).into_response(),
            Err(err) => err.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn handle_generate(
    state: &AppState,
    body: &[u8],
) -> Result<GenerateWordsResponse, AppError> {
    tracing::info!(raw_body = %String::from_utf8_lossy(body), "generate request");

    let request: GenerateWordsRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "rejected unparseable request body");
        AppError::bad_request("Invalid JSON body")
    })?;

    let words_config = &state.config().words;
    let query = request.validate(words_config).map_err(|e| {
        tracing::warn!(error = %e, "rejected request");
        AppError::validation(e.to_string())
    })?;

    tracing::info!(
        l1 = %query.l1,
        tl = %query.tl,
        theme = %query.theme,
        count = query.count,
        policy = words_config.policy.as_str(),
        "requesting words from language model"
    );

    let completion = state.completion();
    let words = word_generation::generate_words(completion.as_ref(), &query, words_config.policy)
        .await
        .map_err(map_generate_error)?;

    tracing::info!(returned = words.len(), requested = query.count, "words generated");

    Ok(GenerateWordsResponse {
        count: words.len(),
        theme: query.theme,
        words,
    })
}

fn map_generate_error(err: GenerateError) -> AppError {
    match err {
        GenerateError::Upstream(LLMError::NotConfigured(var)) => {
            tracing::error!(missing = var, "language model credential is not configured");
            AppError::internal(format!("missing credential {var}"))
        }
        GenerateError::Upstream(e) => {
            tracing::error!(error = %e, "language model call failed");
            AppError::internal(e.to_string())
        }
        GenerateError::Reply(ReplyError::NotJson | ReplyError::MissingWords) => {
            AppError::upstream("INVALID_RESPONSE", "Invalid response from language model")
        }
        GenerateError::Reply(ReplyError::NoValidPairs) => {
            AppError::upstream("NO_WORDS", "No words generated")
        }
        GenerateError::Reply(ReplyError::TooFewPairs { .. }) => {
            AppError::upstream("INSUFFICIENT_WORDS", "Not enough valid words generated")
        }
    }
}

/// CORS preflight: always 200 with an empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> Response {
    AppError::method_not_allowed().into_response()
}
