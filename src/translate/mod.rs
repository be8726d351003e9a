pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::config::{Provider, ProviderConfig, PROMPT_PLACEHOLDER};
use crate::error::{Result, TranslatorError};
use async_trait::async_trait;

/// A backend that turns one piece of source text into translated text.
///
/// Implementations make a single attempt per call; retries belong to the caller.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Substitute `text` into the prompt template.
pub fn render_prompt(template: &str, text: &str) -> Result<String> {
    if !template.contains(PROMPT_PLACEHOLDER) {
        return Err(TranslatorError::Config(format!(
            "Prompt template is missing the placeholder {}",
            PROMPT_PLACEHOLDER
        )));
    }
    Ok(template.replacen(PROMPT_PLACEHOLDER, text, 1))
}

/// Build the client for the configured provider.
pub fn create_client(config: &ProviderConfig) -> Result<Box<dyn TranslationClient>> {
    config.validate()?;

    let client: Box<dyn TranslationClient> = match config.provider {
        Provider::OpenAi => Box::new(OpenAiClient::new(config.clone())),
        Provider::Gemini => Box::new(GeminiClient::new(config.clone())),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt() {
        let prompt = render_prompt("Translate: [TEXTE]", "<p>Hello</p>").unwrap();
        assert_eq!(prompt, "Translate: <p>Hello</p>");
    }

    #[test]
    fn test_render_prompt_does_not_expand_placeholder_in_text() {
        let prompt = render_prompt("Translate: [TEXTE]", "literal [TEXTE] inside").unwrap();
        assert_eq!(prompt, "Translate: literal [TEXTE] inside");
    }

    #[test]
    fn test_render_prompt_missing_placeholder() {
        let result = render_prompt("Translate this please", "Hello");
        assert!(matches!(result, Err(TranslatorError::Config(_))));
    }

    #[test]
    fn test_create_openai_client() {
        let config = ProviderConfig::new(Provider::OpenAi, "sk-test", "gpt-4o-mini", "T: [TEXTE]");
        let client = create_client(&config).unwrap();
        assert_eq!(client.name(), "OpenAI");
    }

    #[test]
    fn test_create_gemini_client() {
        let config =
            ProviderConfig::new(Provider::Gemini, "AIza-test", "gemini-1.5-flash", "T: [TEXTE]");
        let client = create_client(&config).unwrap();
        assert_eq!(client.name(), "Google Gemini");
    }

    #[test]
    fn test_create_client_missing_key() {
        let config = ProviderConfig::new(Provider::Gemini, "", "gemini-1.5-flash", "T: [TEXTE]");
        assert!(matches!(
            create_client(&config),
            Err(TranslatorError::Config(_))
        ));
    }
}
