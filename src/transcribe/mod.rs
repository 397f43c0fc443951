use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

use crate::config::Config;
use crate::youtube::YtDlp;

/// Hugging Face serverless inference endpoint
pub const DEFAULT_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    text: Option<String>,
}

/// Speech recognition for videos without captions.
///
/// The audio track is downloaded with yt-dlp into a temporary directory, sent to a Hugging
/// Face ASR model, and the directory is removed once the request finishes.
pub struct SpeechTranscriber {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    ytdlp: YtDlp,
    temp_root: Option<PathBuf>,
}

impl SpeechTranscriber {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, ytdlp: YtDlp) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("yt-scribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_INFERENCE_BASE.to_string(),
            ytdlp,
            temp_root: None,
        })
    }

    /// Build from configuration; `None` when no Hugging Face key is configured
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(key) = config.hf_api_key() else {
            tracing::warn!("Hugging Face API key (HF_API_KEY) is not set. AI transcription will be disabled.");
            return Ok(None);
        };

        let mut transcriber = Self::new(key, &config.ai.asr_model, YtDlp::new(&config.app.ytdlp_path))?;
        transcriber.temp_root = config.app.temp_dir.clone();
        Ok(Some(transcriber))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Download the audio of a video and transcribe it
    pub async fn transcribe_video(&self, url: &str) -> Result<Option<String>> {
        let temp_dir = match &self.temp_root {
            Some(root) => {
                fs_err::create_dir_all(root)?;
                TempDir::new_in(root)
            }
            None => TempDir::new(),
        }
        .context("Failed to create temporary directory")?;

        let audio_path = temp_dir
            .path()
            .join(format!("audio_{}.mp3", &Uuid::new_v4().simple().to_string()[..8]));

        tracing::info!("Downloading audio to: {}", audio_path.display());
        self.ytdlp.download_audio(url, &audio_path).await?;

        let audio = fs_err::read(&audio_path)?;
        tracing::debug!("Audio size: {} bytes", audio.len());

        self.recognize(audio, "audio/mpeg").await
    }

    /// Send raw audio to the recognition model
    pub async fn recognize(&self, audio: Vec<u8>, content_type: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await
            .context("Speech recognition request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Speech recognition failed: HTTP {}: {}", status, body.trim());
        }

        let result: RecognitionResponse = response
            .json()
            .await
            .context("Failed to parse speech recognition response")?;

        Ok(result
            .text
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()))
    }
}
