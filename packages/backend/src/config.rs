use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 800;
const DEFAULT_WORD_COUNT: u32 = 6;
const DEFAULT_MAX_WORD_COUNT: u32 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub llm: LLMConfig,
    pub words: WordsConfig,
}

/// Upstream completion settings. The credential itself is not part of this
/// struct: it is resolved from the environment on every call.
#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct WordsConfig {
    pub default_count: u32,
    pub max_count: u32,
    pub policy: ValidationPolicy,
}

/// What to do when the model returns fewer valid pairs than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Fail the request unless exactly `count` valid pairs remain.
    Strict,
    /// Return whatever valid pairs remain, up to `count`; fail only on zero.
    #[default]
    Lenient,
}

impl ValidationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    /// Resolves the configured value; anything unrecognised falls back to
    /// lenient with a warning. Tracing must already be installed.
    pub fn from_setting(raw: Option<&str>) -> Self {
        match raw {
            None => Self::default(),
            Some(raw) => Self::parse(raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown WORDS_VALIDATION, using lenient");
                Self::default()
            }),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lenient" => Some(Self::Lenient),
            _ => None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        Self {
            host,
            port,
            llm: LLMConfig::from_env(),
            words: WordsConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            llm: LLMConfig::default(),
            words: WordsConfig::default(),
        }
    }
}

impl LLMConfig {
    pub fn from_env() -> Self {
        let model = env_string("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_endpoint = normalize_endpoint(
            env_string("LLM_API_ENDPOINT")
                .or_else(|| env_string("LLM_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
        );
        let timeout = Duration::from_millis(env_parse("LLM_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_MS));
        let temperature = env_parse("LLM_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE);
        let max_tokens = env_parse("LLM_MAX_TOKENS").unwrap_or(DEFAULT_MAX_TOKENS);

        Self {
            model,
            api_endpoint,
            timeout,
            temperature,
            max_tokens,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl WordsConfig {
    pub fn from_env() -> Self {
        let max_count = env_parse("WORDS_MAX_COUNT")
            .filter(|v: &u32| *v > 0)
            .unwrap_or(DEFAULT_MAX_WORD_COUNT);
        let default_count = env_parse("WORDS_DEFAULT_COUNT")
            .filter(|v: &u32| *v > 0)
            .unwrap_or(DEFAULT_WORD_COUNT)
            .min(max_count);
        let policy = ValidationPolicy::from_setting(env_string("WORDS_VALIDATION").as_deref());

        Self {
            default_count,
            max_count,
            policy,
        }
    }
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_WORD_COUNT,
            max_count: DEFAULT_MAX_WORD_COUNT,
            policy: ValidationPolicy::Lenient,
        }
    }
}

pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key)?.trim().parse().ok()
}

fn normalize_endpoint(endpoint: String) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}
