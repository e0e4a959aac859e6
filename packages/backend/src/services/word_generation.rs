//! Vocabulary generation: request normalisation, prompt templating and
//! validation of the model's free-text JSON reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::{ValidationPolicy, WordsConfig};
use crate::services::llm_provider::{CompletionClient, LLMError};

pub const FALLBACK_THEME: &str = "basic everyday vocabulary";

pub const SYSTEM_PROMPT: &str =
    "You are a language learning assistant. Always respond with valid JSON only.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub native: String,
    pub target: String,
}

/// Raw request body. Everything is optional so that a missing field turns
/// into a 400 with a readable message instead of a rejection from the extractor.
/// `count` stays an untyped JSON value: `5.0` is a valid count and `"5"` gets
/// a count error rather than a generic parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateWordsRequest {
    pub l1: Option<String>,
    pub tl: Option<String>,
    pub theme: Option<String>,
    pub count: Option<Value>,
}

/// A request that passed input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordsQuery {
    pub l1: String,
    pub tl: String,
    pub theme: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateWordsResponse {
    pub words: Vec<WordPair>,
    pub theme: String,
    pub count: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing required languages (l1, tl)")]
    MissingLanguages,
    #[error("Source and target languages must be different")]
    SameLanguages,
    #[error("count must be a whole number between 1 and {max}")]
    CountOutOfRange { max: u32 },
}

/// Why a model reply was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("reply is not valid JSON")]
    NotJson,
    #[error("reply has no `words` array")]
    MissingWords,
    #[error("reply contained no valid word pairs")]
    NoValidPairs,
    #[error("reply contained {got} valid word pairs, {wanted} requested")]
    TooFewPairs { got: usize, wanted: usize },
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Upstream(#[from] LLMError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

impl GenerateWordsRequest {
    pub fn validate(self, config: &WordsConfig) -> Result<WordsQuery, RequestError> {
        let l1 = non_blank(self.l1).ok_or(RequestError::MissingLanguages)?;
        let tl = non_blank(self.tl).ok_or(RequestError::MissingLanguages)?;
        if l1.eq_ignore_ascii_case(&tl) {
            return Err(RequestError::SameLanguages);
        }

        let count = match self.count {
            None => config.default_count as usize,
            Some(value) => whole_count(&value)
                .filter(|n| (1..=u64::from(config.max_count)).contains(n))
                .ok_or(RequestError::CountOutOfRange { max: config.max_count })?
                as usize,
        };

        let theme = non_blank(self.theme).unwrap_or_else(|| FALLBACK_THEME.to_string());

        Ok(WordsQuery { l1, tl, theme, count })
    }
}

/// Accepts integers and integral floats such as `5.0`; anything else is `None`.
fn whole_count(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_u64() {
        return Some(n);
    }
    let n = number.as_f64()?;
    (n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64).then_some(n as u64)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn build_prompt(query: &WordsQuery) -> String {
    let WordsQuery { l1, tl, theme, count } = query;
    format!(
        "Generate exactly {count} common {theme} words.

Return a JSON object with this exact structure:
{{
  \"words\": [
    {{\"native\": \"{l1} word\", \"target\": \"{tl} translation\"}},
    {{\"native\": \"{l1} word\", \"target\": \"{tl} translation\"}}
  ]
}}

Requirements:
- Provide exactly {count} word pairs
- Use common, useful vocabulary appropriate for A1-A2 level learners
- Words should be single words or simple phrases (no sentences)
- Ensure translations are accurate
- Return only valid JSON, no additional text

Source language: {l1}
Target language: {tl}
Theme: {theme}"
    )
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    // The tag may be followed by a newline (LF or CRLF) or sit on the same
    // line as the payload.
    let tag_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    body[tag_len..].trim()
}

/// Parses and validates a model reply in one step.
///
/// Pairs missing either side, with a non-string side, or with a side that is
/// blank after trimming are dropped. The result never exceeds `wanted`.
pub fn parse_reply(
    raw: &str,
    wanted: usize,
    policy: ValidationPolicy,
) -> Result<Vec<WordPair>, ReplyError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw)).map_err(|_| ReplyError::NotJson)?;
    let entries = value
        .get("words")
        .and_then(Value::as_array)
        .ok_or(ReplyError::MissingWords)?;

    let mut words: Vec<WordPair> = entries.iter().filter_map(validate_pair).collect();
    let dropped = entries.len() - words.len();
    if dropped > 0 {
        tracing::warn!(dropped, received = entries.len(), "dropped invalid word pairs");
    }

    if words.is_empty() {
        return Err(ReplyError::NoValidPairs);
    }
    if policy == ValidationPolicy::Strict && words.len() < wanted {
        return Err(ReplyError::TooFewPairs { got: words.len(), wanted });
    }

    words.truncate(wanted);
    Ok(words)
}

fn validate_pair(entry: &Value) -> Option<WordPair> {
    let side = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some(WordPair { native: side("native")?, target: side("target")? })
}

/// Runs one generation: prompt, single upstream call, reply validation.
pub async fn generate_words(
    client: &dyn CompletionClient,
    query: &WordsQuery,
    policy: ValidationPolicy,
) -> Result<Vec<WordPair>, GenerateError> {
    let prompt = build_prompt(query);
    let raw = client.complete(SYSTEM_PROMPT, &prompt).await?;
    tracing::debug!(reply = %raw, "raw model reply");

    parse_reply(&raw, query.count, policy).map_err(|err| {
        tracing::error!(error = %err, reply = %raw, "unusable model reply");
        GenerateError::Reply(err)
    })
}
