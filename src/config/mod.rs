use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::mask_secret;
use crate::ScribeError;

/// Value shipped in sample `.env` files; treated as if no key was given
pub const GOOGLE_AI_KEY_PLACEHOLDER: &str = "YOUR_GOOGLE_AI_STUDIO_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// Language model and speech recognition settings
    pub ai: AiConfig,

    /// Google Docs settings
    pub docs: DocsConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// YouTube Data API v3 key
    pub api_key: Option<String>,

    /// Caption languages, most preferred first
    pub caption_languages: Vec<String>,

    /// Base URL of the Data API
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Google AI Studio key used for polishing
    pub google_api_key: Option<String>,

    /// Gemini model used for polishing
    pub gemini_model: String,

    /// Hugging Face token used for speech recognition
    pub hf_api_key: Option<String>,

    /// Speech recognition model on the Hugging Face inference API
    pub asr_model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Service account JSON file with access to the target documents
    pub credentials_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for Word documents (asked for when unset and no Desktop exists)
    pub output_dir: Option<PathBuf>,

    /// Temporary directory for audio downloads
    pub temp_dir: Option<PathBuf>,

    /// yt-dlp executable
    pub ytdlp_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YouTubeConfig {
                api_key: None,
                caption_languages: vec!["en".to_string(), "vi".to_string()],
                api_base_url: crate::youtube::DEFAULT_API_BASE.to_string(),
            },
            ai: AiConfig {
                google_api_key: None,
                gemini_model: "gemini-1.5-flash".to_string(),
                hf_api_key: None,
                asr_model: "openai/whisper-large-v3".to_string(),
            },
            docs: DocsConfig {
                credentials_path: Some(PathBuf::from("credentials.json")),
            },
            app: AppConfig {
                output_dir: None,
                temp_dir: None,
                ytdlp_path: "yt-dlp".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default, then apply environment overrides
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            serde_yaml::from_str::<Config>(&content).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save().await?;
            config
        };

        config.apply_env();
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("yt-scribe").join("config.yaml"))
    }

    /// Override file settings with the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Override file settings with values from `lookup`; empty values are ignored
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = var("YOUTUBE_DATA_API_KEY") {
            self.youtube.api_key = Some(key);
        }
        if let Some(key) = var("GOOGLE_AI_API_KEY") {
            self.ai.google_api_key = Some(key);
        }
        if let Some(key) = var("HF_API_KEY") {
            self.ai.hf_api_key = Some(key);
        }
        if let Some(path) = var("GOOGLE_DOCS_CREDENTIALS_PATH") {
            self.docs.credentials_path = Some(PathBuf::from(path));
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.youtube_api_key()?;

        if self.youtube.caption_languages.is_empty() {
            anyhow::bail!("At least one caption language must be configured");
        }

        Ok(())
    }

    /// The YouTube Data API key, which every operation needs
    pub fn youtube_api_key(&self) -> Result<&str, ScribeError> {
        self.youtube
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ScribeError::MissingApiKey("YOUTUBE_DATA_API_KEY"))
    }

    /// The Google AI key, unless unset or still the sample placeholder
    pub fn google_ai_key(&self) -> Option<&str> {
        self.ai
            .google_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && *key != GOOGLE_AI_KEY_PLACEHOLDER)
    }

    /// The Hugging Face token, if set
    pub fn hf_api_key(&self) -> Option<&str> {
        self.ai
            .hf_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    /// Display current configuration
    pub fn display(&self) {
        let key = |value: Option<&str>| value.map(mask_secret).unwrap_or_else(|| "(not set)".to_string());
        let path = |value: &Option<PathBuf>| {
            value
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string())
        };

        println!("Current Configuration:");
        println!("  YouTube API Key: {}", key(self.youtube.api_key.as_deref()));
        println!("  Caption Languages: {}", self.youtube.caption_languages.join(", "));
        println!("  YouTube API URL: {}", self.youtube.api_base_url);
        println!("  Google AI Key: {}", key(self.google_ai_key()));
        println!("  Gemini Model: {}", self.ai.gemini_model);
        println!("  Hugging Face Key: {}", key(self.hf_api_key()));
        println!("  ASR Model: {}", self.ai.asr_model);
        println!("  Docs Credentials: {}", path(&self.docs.credentials_path));
        println!("  Word Output Dir: {}", path(&self.app.output_dir));
        println!("  Temp Dir: {}", path(&self.app.temp_dir));
        println!("  yt-dlp: {}", self.app.ytdlp_path);
    }

    /// Tell the user where settings live
    pub fn interactive_setup(&self) -> Result<()> {
        println!("Edit the config file to change settings:");
        println!("  {}", Self::config_path()?.display());
        println!();
        println!("API keys can also be provided through the environment or a .env file:");
        println!("  YOUTUBE_DATA_API_KEY, GOOGLE_AI_API_KEY, HF_API_KEY, GOOGLE_DOCS_CREDENTIALS_PATH");
        Ok(())
    }
}
