use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::filter::Period;
use crate::output::Destination;

pub mod prompt;

pub use prompt::Prompter;

#[derive(Parser, Debug)]
#[command(
    name = "ytscribe",
    about = "yt-scribe - Collect YouTube transcripts from videos, channels and playlists into Google Docs or Word",
    version,
    long_about = "Fetches the captions of single videos, whole channels or playlists (optionally filtered by publish period and excluding shorts), falls back to speech recognition when a video has no captions, optionally polishes the text with Gemini, and writes everything into a Google Doc or a Word file. Run without a command for the interactive session."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch transcripts of one or more videos, in the given order
    Video {
        /// Video URLs (watch, youtu.be, shorts, embed, live) or bare video ids
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch transcripts of every video of a channel, newest first
    Channel {
        /// Channel id (starts with UC)
        #[arg(value_name = "CHANNEL_ID")]
        channel_id: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch transcripts of every video of a playlist, in playlist order
    Playlist {
        /// Playlist URL (must contain list=)
        #[arg(value_name = "PLAYLIST_URL")]
        url: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show where settings live, or the effective configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Publish period: all, b-MM/DD/YYYY, MM/DD/YYYY-e or MM/DD/YYYY-MM/DD/YYYY
    #[arg(short, long, value_name = "PERIOD", default_value = "all")]
    pub period: Period,

    /// Keep videos of 60 seconds or less
    #[arg(long)]
    pub include_shorts: bool,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Append to this Google Doc (sharing link)
    #[arg(long, value_name = "LINK", conflicts_with = "word_dir")]
    pub google_doc: Option<String>,

    /// Write a Word document into this directory (default: Desktop)
    #[arg(long, value_name = "DIR")]
    pub word_dir: Option<PathBuf>,

    /// Correct grammar and paragraphs with Gemini
    #[arg(long)]
    pub polish: bool,

    /// Transcribe the audio of videos without captions
    #[arg(long)]
    pub transcribe_missing: bool,
}

impl OutputArgs {
    pub fn destination(&self) -> Destination {
        match &self.google_doc {
            Some(link) => Destination::GoogleDoc(link.clone()),
            None => Destination::Word(self.word_dir.clone()),
        }
    }
}
