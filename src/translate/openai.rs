//! Translation through the OpenAI chat completions API.

use crate::config::{ProviderConfig, PROMPT_PLACEHOLDER};
use crate::error::{Result, TranslatorError};
use crate::translate::{render_prompt, TranslationClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

const TEMPERATURE: f32 = 0.3;

/// Translator using the OpenAI chat completions API.
pub struct OpenAiClient {
    client: Client,
    config: ProviderConfig,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    /// Point the client at another API root (e.g. a proxy or a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, text: &str) -> Result<ChatRequest> {
        let prompt = render_prompt(&self.config.prompt_template, text)?;

        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = system_instructions(&self.config.prompt_template) {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: instructions,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt,
        });

        Ok(ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: TEMPERATURE,
        })
    }
}

/// The template without the line carrying the placeholder.
fn system_instructions(template: &str) -> Option<String> {
    let instructions = template
        .lines()
        .filter(|line| !line.contains(PROMPT_PLACEHOLDER))
        .collect::<Vec<_>>()
        .join("\n");
    let instructions = instructions.trim();
    (!instructions.is_empty()).then(|| instructions.to_string())
}

#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
    #[serde(default)]
    r#type: Option<String>,
}

#[async_trait]
impl TranslationClient for OpenAiClient {
    async fn translate(&self, text: &str) -> Result<String> {
        let request = self.build_request(text)?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending {} chars to OpenAI ({})", text.len(), self.config.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslatorError::Provider(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranslatorError::Provider(format!("Failed to read OpenAI response: {}", e)))?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(TranslatorError::Provider(format!(
                    "OpenAI API error ({}): {} ({})",
                    status,
                    api_error.error.message,
                    api_error.error.r#type.unwrap_or_default()
                )));
            }
            return Err(TranslatorError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            TranslatorError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        Ok(parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }
}
