//! yt-scribe - A Rust CLI tool for collecting YouTube transcripts into documents
//!
//! This library discovers videos from a single URL, a channel or a playlist, filters them by
//! publish period and length, fetches their captions (or transcribes the audio when none exist),
//! optionally polishes the text with a language model and writes everything into a Google Doc
//! or a Word file.

pub mod app;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod filter;
pub mod output;
pub mod polish;
pub mod transcribe;
pub mod utils;
pub mod youtube;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{Extractor, VideoRecord, VideoSource};
pub use filter::{Period, VideoFilter};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to yt-scribe
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(&'static str),

    #[error("YouTube API error {status}: {body}")]
    YouTubeApi { status: u16, body: String },

    #[error("Cannot access document: {0}")]
    DocumentAccess(String),
}
