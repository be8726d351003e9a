//! Gemini-based translation using the Generative AI API.

use crate::config::ProviderConfig;
use crate::error::{Result, TranslatorError};
use crate::translate::{render_prompt, TranslationClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1";

/// Translator using Google Gemini API.
pub struct GeminiClient {
    client: Client,
    config: ProviderConfig,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Point the client at another API root (e.g. `v1beta` or a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.config.model, self.config.api_key
        )
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponseContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

#[async_trait]
impl TranslationClient for GeminiClient {
    async fn translate(&self, text: &str) -> Result<String> {
        let prompt = render_prompt(&self.config.prompt_template, text)?;

        debug!("Sending {} chars to Gemini ({})", text.len(), self.config.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslatorError::Provider(format!("Gemini request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranslatorError::Provider(format!("Failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(TranslatorError::Provider(format!(
                "Gemini API error ({}): {}",
                status, message
            )));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            TranslatorError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        if let Some(error) = gemini_response.error {
            return Err(TranslatorError::Provider(format!(
                "Gemini error: {}",
                error.message
            )));
        }

        Ok(gemini_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|p| p.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "Google Gemini"
    }
}
