use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{defaults, paths};
use crate::context::{ContextWindow, PromptAssembler};
use crate::error::ConvoError;
use crate::llm::provider::{GenerationOptions, ProviderConfig, ProviderId, ProviderRegistry};
use crate::llm::ModelGateway;
use crate::poster::TmdbPosterLookup;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub context: ContextSettings,
    #[serde(default)]
    pub posters: PosterSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ProviderId,
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    pub max_document_chars: usize,
    /// 0 replays the whole history.
    pub max_history_turns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterSettings {
    pub enabled: bool,
    pub api_key_env: String,
    pub base_url: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let provider = ProviderId::Gemini;
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key_env: provider.default_api_key_env().to_string(),
            base_url: None,
            temperature: Some(defaults::TEMPERATURE),
            max_output_tokens: None,
        }
    }
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_document_chars: defaults::MAX_DOCUMENT_CHARS,
            max_history_turns: defaults::MAX_HISTORY_TURNS,
        }
    }
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: defaults::TMDB_API_KEY_ENV.to_string(),
            base_url: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Missing or unreadable files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("ignoring malformed {}: {e}", path.display()),
                },
                Err(e) => tracing::warn!("could not read {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), ConvoError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConvoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConvoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Switch provider, resetting model and key variable to that provider's defaults.
    pub fn set_provider(&mut self, provider: ProviderId) {
        self.llm.provider = provider;
        self.llm.model = provider.default_model().to_string();
        self.llm.api_key_env = provider.default_api_key_env().to_string();
        self.llm.base_url = None;
    }

    pub fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::for_provider(self.llm.provider);
        config.api_key_env = self.llm.api_key_env.clone();
        if let Some(ref url) = self.llm.base_url {
            config.base_url = url.clone();
        }
        config
    }

    pub fn build_provider_registry(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.configure(self.provider_config());
        registry.set_active(self.llm.provider, self.llm.model.clone());
        registry
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.llm.temperature,
            max_output_tokens: self.llm.max_output_tokens,
        }
    }

    pub fn build_gateway(&self) -> Result<ModelGateway, ConvoError> {
        let client = self
            .build_provider_registry()
            .build_active_client(self.generation_options())?;
        Ok(ModelGateway::new(client))
    }

    pub fn prompt_assembler(&self) -> PromptAssembler {
        PromptAssembler::new()
            .with_window(ContextWindow::from_setting(self.context.max_history_turns))
            .with_max_document_chars(self.context.max_document_chars)
    }

    /// `None` when posters are disabled or no key is set; recommendations then carry no artwork.
    pub fn build_poster_lookup(&self) -> Option<TmdbPosterLookup> {
        if !self.posters.enabled {
            return None;
        }
        let key = std::env::var(&self.posters.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())?;
        let mut lookup = TmdbPosterLookup::new(key);
        if let Some(ref url) = self.posters.base_url {
            lookup = lookup.with_base_url(url);
        }
        Some(lookup)
    }
}
