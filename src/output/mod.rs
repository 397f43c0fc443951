use async_trait::async_trait;
use std::path::PathBuf;

use crate::Result;

pub mod google_docs;
pub mod word;

pub use google_docs::GoogleDocsWriter;
pub use word::{default_word_dir, WordWriter};

/// Text written for a video that has neither captions nor a transcription
pub const NO_TRANSCRIPT_TEXT: &str = "No transcript available for this video.";

/// Where transcripts are collected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// An existing Google Doc, identified by its sharing link
    GoogleDoc(String),

    /// A new Word document in the given directory (or the default one)
    Word(Option<PathBuf>),
}

/// A document that receives one section per video
#[async_trait]
pub trait DocWriter: Send {
    /// Add a video's title and transcript
    async fn write_video(&mut self, title: &str, content: &str) -> Result<()>;

    /// Finish the document
    async fn save(&mut self) -> Result<()>;
}
