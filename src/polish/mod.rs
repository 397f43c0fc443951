use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;

/// Google AI Studio REST endpoint
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Prompt asking the model to clean up a raw transcript without changing its content
pub fn formatting_prompt(text: &str) -> String {
    format!(
        "Please format the following text. Correct grammar, spelling, and punctuation.\n\
         Organize it into sensible paragraphs. Do not add or remove any information or change the original meaning.\n\
         Return only the formatted text.\n\
         \n\
         Original Text:\n\
         ---\n\
         {}\n\
         ---\n",
        text
    )
}

/// Transcript polishing through Gemini
pub struct TextPolisher {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl TextPolisher {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("yt-scribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE.to_string(),
        })
    }

    /// Build from configuration; `None` when no usable Google AI key is configured
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        match config.google_ai_key() {
            Some(key) => Ok(Some(Self::new(key, &config.ai.gemini_model)?)),
            None => {
                tracing::warn!("Google AI API key not set. AI formatting will be disabled.");
                Ok(None)
            }
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Return the polished text, or `None` if the model produced nothing
    pub async fn polish(&self, text: &str) -> Result<Option<String>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = json!({
            "contents": [{
                "parts": [{ "text": formatting_prompt(text) }]
            }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, body.trim());
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(text)
    }
}
