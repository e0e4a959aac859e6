use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::services::llm_provider::{CompletionClient, LLMProvider};

/// Shared, immutable request context. Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    completion: Arc<dyn CompletionClient>,
}

impl AppState {
    pub fn new(config: Config, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            completion,
        }
    }

    /// Wires the real OpenAI-compatible provider from `config.llm`.
    pub fn from_config(config: Config) -> Self {
        let provider = LLMProvider::new(config.llm.clone());
        Self::new(config, Arc::new(provider))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn completion(&self) -> Arc<dyn CompletionClient> {
        Arc::clone(&self.completion)
    }
}
