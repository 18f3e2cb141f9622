use crate::constants::{defaults, endpoints, models};
use crate::error::ConvoError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies a hosted or local text-generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    OpenAI,
    Groq,
    OpenRouter,
    Ollama,
}

impl ProviderId {
    pub fn name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini (Google)",
            Self::OpenAI => "OpenAI",
            Self::Groq => "Groq",
            Self::OpenRouter => "OpenRouter",
            Self::Ollama => "Ollama (Local)",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAI),
            "groq" => Some(Self::Groq),
            "openrouter" => Some(Self::OpenRouter),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Ollama)
    }

    pub fn needs_api_key(&self) -> bool {
        !self.is_local()
    }

    pub fn default_base_url(&self) -> &str {
        match self {
            Self::Gemini => endpoints::GEMINI_BASE_URL,
            Self::OpenAI => endpoints::OPENAI_BASE_URL,
            Self::Groq => endpoints::GROQ_BASE_URL,
            Self::OpenRouter => endpoints::OPENROUTER_BASE_URL,
            Self::Ollama => endpoints::OLLAMA_BASE_URL,
        }
    }

    pub fn default_api_key_env(&self) -> &str {
        match self {
            Self::Gemini => defaults::GEMINI_API_KEY_ENV,
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Ollama => "",
        }
    }

    pub fn default_model(&self) -> &str {
        match self {
            Self::Gemini => models::DEFAULT_GEMINI_MODEL,
            Self::OpenAI => models::DEFAULT_OPENAI_MODEL,
            Self::Groq => models::DEFAULT_GROQ_MODEL,
            Self::OpenRouter => models::DEFAULT_OPENROUTER_MODEL,
            Self::Ollama => models::DEFAULT_OLLAMA_MODEL,
        }
    }

    pub fn all() -> Vec<ProviderId> {
        vec![
            Self::Gemini,
            Self::OpenAI,
            Self::Groq,
            Self::OpenRouter,
            Self::Ollama,
        ]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub api_key_env: String,
    pub base_url: String,
}

impl ProviderConfig {
    pub fn for_provider(id: ProviderId) -> Self {
        Self {
            id,
            api_key_env: id.default_api_key_env().to_string(),
            base_url: id.default_base_url().to_string(),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Sampling knobs forwarded to whichever client gets built.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// Holds the provider configs and which provider/model is active.
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, ProviderConfig>,
    active_provider: ProviderId,
    active_model: String,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        let providers = ProviderId::all()
            .into_iter()
            .map(|id| (id, ProviderConfig::for_provider(id)))
            .collect();

        Self {
            providers,
            active_provider: ProviderId::Gemini,
            active_model: models::DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    pub fn set_active(&mut self, provider: ProviderId, model: String) {
        self.active_provider = provider;
        self.active_model = model;
    }

    pub fn active_config(&self) -> Option<&ProviderConfig> {
        self.providers.get(&self.active_provider)
    }

    /// Replace the stored config for a provider (custom key variable or base URL).
    pub fn configure(&mut self, config: ProviderConfig) {
        self.providers.insert(config.id, config);
    }

    /// Build an LLM client for the currently active provider/model.
    pub fn build_active_client(
        &self,
        options: GenerationOptions,
    ) -> Result<Box<dyn super::LlmClient>, ConvoError> {
        let config = self.active_config().ok_or_else(|| {
            ConvoError::Config(format!("Provider {} not configured", self.active_provider))
        })?;

        Self::build_client_for(config, &self.active_model, options)
    }

    /// Build an LLM client for a specific provider and model.
    pub fn build_client_for(
        config: &ProviderConfig,
        model: &str,
        options: GenerationOptions,
    ) -> Result<Box<dyn super::LlmClient>, ConvoError> {
        let api_key = if config.id.needs_api_key() {
            config.api_key().ok_or_else(|| {
                ConvoError::Config(format!(
                    "Set {} environment variable for {}",
                    config.api_key_env,
                    config.id.name()
                ))
            })?
        } else {
            String::new()
        };

        match config.id {
            ProviderId::Gemini => {
                let client = super::GeminiClient::new(api_key)
                    .with_model(model)
                    .with_base_url(&config.base_url)
                    .with_temperature(options.temperature)
                    .with_max_output_tokens(options.max_output_tokens);
                Ok(Box::new(client))
            }
            // Everything else speaks the OpenAI chat-completions dialect
            _ => {
                let client = super::OpenAIClient::new(api_key)
                    .with_model(model)
                    .with_base_url(&config.base_url)
                    .with_temperature(options.temperature)
                    .with_max_tokens(options.max_output_tokens);
                Ok(Box::new(client))
            }
        }
    }
}

/// Token usage tracking across one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageTracker {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub request_count: u64,
}

impl UsageTracker {
    pub fn track(&mut self, input: u32, output: u32) {
        self.total_input_tokens += input as u64;
        self.total_output_tokens += output as u64;
        self.request_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(ProviderId::parse("Google"), Some(ProviderId::Gemini));
        assert_eq!(ProviderId::parse("openai"), Some(ProviderId::OpenAI));
        assert_eq!(ProviderId::parse("anthropic"), None);
    }

    #[test]
    fn ollama_builds_without_key() {
        let config = ProviderConfig::for_provider(ProviderId::Ollama);
        let client =
            ProviderRegistry::build_client_for(&config, "llama3.2", GenerationOptions::default())
                .unwrap();
        assert_eq!(client.model(), "llama3.2");
    }

    #[test]
    fn missing_key_is_config_error() {
        let config = ProviderConfig {
            api_key_env: "CONVO_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..ProviderConfig::for_provider(ProviderId::Gemini)
        };
        let err = ProviderRegistry::build_client_for(&config, "m", GenerationOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, ConvoError::Config(_)));
    }

    #[test]
    fn usage_tracker_accumulates() {
        let mut tracker = UsageTracker::default();
        tracker.track(10, 5);
        tracker.track(3, 2);
        assert_eq!(tracker.total_input_tokens, 13);
        assert_eq!(tracker.total_output_tokens, 7);
        assert_eq!(tracker.request_count, 2);
    }
}
