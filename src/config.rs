use crate::error::{Result, TranslatorError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Token in the prompt template that is replaced by the text to translate.
pub const PROMPT_PLACEHOLDER: &str = "[TEXTE]";

pub const DEFAULT_PROMPT: &str = "You are an expert Dungeons & Dragons 5e translator. \
Translate the following text into fluent, immersive French, keeping ALL of the original HTML \
formatting intact (do not modify, add or remove any tag). Use the official French D&D 5e terms: \
'hit points' -> 'points de vie', 'saving throw' -> 'jet de sauvegarde', 'Armor Class' -> \
'classe d'armure', 'proficiency bonus' -> 'bonus de maîtrise', 'spell slots' -> \
'emplacements de sorts', etc. Keep the narrative tone and the game mechanics intact. Do not \
summarize and do not add comments, translate the provided content faithfully.\n\n\
Text to translate: [TEXTE]";

pub const DEFAULT_TARGET_PREFIX: &str = "[FR] ";
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_COOLDOWN_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Gemini,
}

impl Provider {
    /// Model used when the configuration does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Gemini => "gemini-1.5-flash",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            _ => Err(format!("Unknown provider: {}. Use 'openai' or 'gemini'", s)),
        }
    }
}

/// Immutable provider settings for one translation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub prompt_template: String,
}

impl ProviderConfig {
    pub fn new(
        provider: Provider,
        api_key: impl Into<String>,
        model: impl Into<String>,
        prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
            prompt_template: prompt_template.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(TranslatorError::Config(format!(
                "API key not set. Add `api_key` to the config file or export {}",
                self.provider.api_key_env()
            )));
        }

        match self.prompt_template.matches(PROMPT_PLACEHOLDER).count() {
            1 => Ok(()),
            0 => Err(TranslatorError::Config(format!(
                "Prompt template must contain the placeholder {}",
                PROMPT_PLACEHOLDER
            ))),
            n => Err(TranslatorError::Config(format!(
                "Prompt template must contain the placeholder {} exactly once (found {})",
                PROMPT_PLACEHOLDER, n
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    /// Key used whatever the provider. Takes precedence over the per-provider keys.
    pub api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub prompt: String,
    pub target_prefix: String,
    pub batch_size: usize,
    pub cooldown_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            openai_api_key: None,
            gemini_api_key: None,
            model: None,
            prompt: DEFAULT_PROMPT.to_string(),
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                match toml::from_str::<Config>(&contents) {
                    Ok(file_config) => config = file_config,
                    Err(e) => warn!("Ignoring invalid config file {:?}: {}", config_path, e),
                }
            }
        }

        // Override with environment variables
        if let Ok(provider) = std::env::var("COMPENDIUM_TRANSLATOR_PROVIDER") {
            if let Ok(p) = provider.parse() {
                config.provider = p;
            }
        }
        if let Ok(key) = std::env::var("COMPENDIUM_TRANSLATOR_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(key) = std::env::var(Provider::OpenAi.api_key_env()) {
            config.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var(Provider::Gemini.api_key_env()) {
            config.gemini_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("COMPENDIUM_TRANSLATOR_MODEL") {
            config.model = Some(model);
        }
        if let Ok(size) = std::env::var("COMPENDIUM_TRANSLATOR_BATCH_SIZE") {
            if let Ok(s) = size.parse() {
                config.batch_size = s;
            }
        }
        if let Ok(cooldown) = std::env::var("COMPENDIUM_TRANSLATOR_COOLDOWN_MS") {
            if let Ok(c) = cooldown.parse() {
                config.cooldown_ms = c;
            }
        }

        Ok(config)
    }

    /// Key for the current provider: the shared `api_key` if set, else the
    /// key registered for that provider.
    pub fn api_key_for(&self, provider: Provider) -> Option<&str> {
        let provider_key = match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Gemini => self.gemini_api_key.as_deref(),
        };
        self.api_key.as_deref().or(provider_key)
    }

    /// Snapshot of the provider settings, with the model defaulted per provider.
    pub fn provider_config(&self) -> ProviderConfig {
        let model = self
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model());

        ProviderConfig::new(
            self.provider,
            self.api_key_for(self.provider).unwrap_or_default(),
            model,
            self.prompt.clone(),
        )
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.provider_config().validate()?;

        if self.batch_size == 0 {
            return Err(TranslatorError::Config(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("compendium-translator").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("GEMINI".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("claude".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_display_roundtrips() {
        for provider in [Provider::OpenAi, Provider::Gemini] {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.cooldown(), Duration::from_millis(1000));
        assert_eq!(config.target_prefix, "[FR] ");
        assert!(config.prompt.ends_with(PROMPT_PLACEHOLDER));
    }

    #[test]
    fn test_model_defaults_per_provider() {
        let mut config = Config::default();
        assert_eq!(config.provider_config().model, "gpt-4o-mini");

        config.provider = Provider::Gemini;
        assert_eq!(config.provider_config().model, "gemini-1.5-flash");

        config.model = Some("gemini-1.5-pro".to_string());
        assert_eq!(config.provider_config().model, "gemini-1.5-pro");

        config.model = Some("   ".to_string());
        assert_eq!(config.provider_config().model, "gemini-1.5-flash");
    }

    #[test]
    fn test_validate_missing_api_key() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(TranslatorError::Config(_))));

        config.api_key = Some(String::new());
        assert!(config.validate().is_err());

        config.api_key = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_with_api_key() {
        let mut config = Config::default();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_follows_provider_switch() {
        let mut config = Config::default();
        config.openai_api_key = Some("sk-openai".to_string());
        config.gemini_api_key = Some("AIza-gemini".to_string());
        assert_eq!(config.provider_config().api_key, "sk-openai");

        config.provider = "gemini".parse().unwrap();
        assert_eq!(config.provider_config().api_key, "AIza-gemini");
    }

    #[test]
    fn test_shared_api_key_takes_precedence() {
        let mut config = Config::default();
        config.provider = Provider::Gemini;
        config.gemini_api_key = Some("AIza-gemini".to_string());
        config.api_key = Some("shared".to_string());
        assert_eq!(config.provider_config().api_key, "shared");
    }

    #[test]
    fn test_missing_key_for_selected_provider() {
        let mut config = Config::default();
        config.openai_api_key = Some("sk-openai".to_string());
        config.provider = Provider::Gemini;
        assert_eq!(config.provider_config().api_key, "");
        assert!(matches!(config.validate(), Err(TranslatorError::Config(_))));
    }

    #[test]
    fn test_validate_prompt_placeholder_count() {
        let mut config = Config::default();
        config.api_key = Some("sk-test".to_string());

        config.prompt = "Translate this".to_string();
        assert!(config.validate().is_err());

        config.prompt = "[TEXTE] and again [TEXTE]".to_string();
        assert!(config.validate().is_err());

        config.prompt = "Translate: [TEXTE]".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut config = Config::default();
        config.api_key = Some("sk-test".to_string());
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_file() {
        let config: Config = toml::from_str(
            "provider = \"gemini\"\nbatch_size = 3\ngemini_api_key = \"AIza-file\"\n",
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.provider_config().api_key, "AIza-file");
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.cooldown_ms, DEFAULT_COOLDOWN_MS);
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }
}
