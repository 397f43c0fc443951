//! Orchestration of a transcript collection run, from the command line or interactively.

use anyhow::Context;
use console::style;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::{Commands, FilterArgs, OutputArgs, Prompter};
use crate::config::Config;
use crate::extractors::{ChannelSource, Extractor, PlaylistSource, SingleVideoExtractor, VideoRecord};
use crate::filter::{Period, VideoFilter};
use crate::output::{
    default_word_dir, Destination, DocWriter, GoogleDocsWriter, WordWriter, NO_TRANSCRIPT_TEXT,
};
use crate::polish::TextPolisher;
use crate::transcribe::SpeechTranscriber;
use crate::utils::{format_duration, spinner};
use crate::youtube::{playlist_id_from_url, ChannelListing, PlaylistListing, YouTubeClient, YtDlp};
use crate::{Result, ScribeError};

const SINGLE_VIDEO_SUCCESS: &str = "Transcripts kidnapped successfully!!";
const SINGLE_VIDEO_NOTE: &str =
    "The videos in the doc are sorted from the first video you entered to the last video you entered.";

/// What to do with a video that has no captions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTranscript {
    /// Ask the user for each such video
    Ask,
    /// Transcribe the audio
    Always,
    /// Write the placeholder text
    Never,
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    pub polish: bool,
    pub missing: MissingTranscript,
}

pub struct Application {
    config: Config,
    youtube: Arc<YouTubeClient>,
    ytdlp: YtDlp,
    transcriber: Option<SpeechTranscriber>,
    polisher: Option<TextPolisher>,
    prompter: Prompter,
    quiet: bool,
}

impl Application {
    pub fn new(config: Config, prompter: Prompter, quiet: bool) -> Result<Self> {
        let api_key = config.youtube_api_key()?;
        let youtube = Arc::new(YouTubeClient::with_base_url(api_key, &config.youtube.api_base_url)?);

        Ok(Self {
            ytdlp: YtDlp::new(&config.app.ytdlp_path),
            transcriber: SpeechTranscriber::from_config(&config)?,
            polisher: TextPolisher::from_config(&config)?,
            youtube,
            config,
            prompter,
            quiet,
        })
    }

    /// Run a command given on the command line
    pub async fn run_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Video { urls, output } => {
                let options = command_options(&output);
                let mut writer = self.open_destination(output.destination()).await?;
                let videos = self.resolve_videos(&urls).await;
                if videos.is_empty() {
                    anyhow::bail!("None of the given URLs could be resolved to a video");
                }
                self.say_video_count(videos.len())?;
                self.process_videos(&videos, writer.as_mut(), &options).await
            }
            Commands::Channel { channel_id, filter, output } => {
                if !self.youtube.channel_exists(&channel_id).await? {
                    anyhow::bail!("Invalid YouTube channel ID: {}", channel_id);
                }
                let options = command_options(&output);
                let mut writer = self.open_destination(output.destination()).await?;
                let extractor = self.channel_extractor(&channel_id, &filter);
                self.process_extractor(&extractor, writer.as_mut(), &options)
                    .await
                    .map(|_| ())
            }
            Commands::Playlist { url, filter, output } => {
                let playlist_id = playlist_id_from_url(&url)
                    .ok_or_else(|| ScribeError::InvalidUrl(format!("no list= parameter in {}", url)))?;
                if !self.youtube.playlist_exists(&playlist_id).await? {
                    anyhow::bail!("YouTube playlist not found: {}", playlist_id);
                }
                let options = command_options(&output);
                let mut writer = self.open_destination(output.destination()).await?;
                let extractor = self.playlist_extractor(&playlist_id, &filter);
                self.process_extractor(&extractor, writer.as_mut(), &options)
                    .await
                    .map(|_| ())
            }
            Commands::Config { show } => {
                if show {
                    self.config.display();
                    Ok(())
                } else {
                    self.config.interactive_setup()
                }
            }
        }
    }

    /// Menu-driven session; loops until the user declines another mission
    pub async fn run_interactive(&mut self) -> Result<()> {
        loop {
            self.say(
                "\n💕 Hello beautiful,\nYour magical YouTube data helper is here to save the day! \
                 What YouTube adventure shall we embark on today? 🚀\n",
            )?;
            self.say("1. Single Video Wormhole 😚🖐️")?;
            self.say("2. Channel Conquest Mission 🐟🔱")?;
            self.say("3. Playlist Treasure Hunt 💎📿\n")?;
            let task = self
                .prompter
                .ask_choice("Only 1, 2, or 3 - Choose wisely 😉!\n", &["1", "2", "3"])?;

            self.say("\nNow select your expedition vessel:")?;
            self.say("1. Google Doc (accessible on all platforms)")?;
            self.say("2. MS Word (local file)\n")?;
            let doc = self.prompter.ask_choice("Please enter 1 or 2.\n", &["1", "2"])?;

            let writer = if doc == "1" {
                self.ask_google_doc().await
            } else {
                self.ask_word_dir()
                    .map(|dir| Box::new(WordWriter::new(dir)) as Box<dyn DocWriter>)
            };

            // A destination that cannot be opened ends this mission, not the session
            let outcome = match writer {
                Ok(mut writer) => self.run_mission(&task, writer.as_mut()).await,
                Err(e) => Err(e),
            };

            if let Err(e) = outcome {
                self.say(&format!("{} {:#}", style("Error:").red().bold(), e))?;
            }

            if !self
                .prompter
                .ask_yes_no("\nWould you like to start another mission? [y/n]\n")?
            {
                self.say("\n✨ All done! Hope that was helpful, my dearest! ✨")?;
                return Ok(());
            }
        }
    }

    fn say(&mut self, message: &str) -> Result<()> {
        self.prompter.say(message)
    }

    async fn run_mission(&mut self, task: &str, writer: &mut dyn DocWriter) -> Result<()> {
        match task {
            "1" => self.interactive_single_videos(writer).await,
            "2" => {
                let extractor = self.ask_channel_extractor().await?;
                self.interactive_collection(&extractor, writer).await
            }
            _ => {
                let extractor = self.ask_playlist_extractor().await?;
                self.interactive_collection(&extractor, writer).await
            }
        }
    }

    fn say_video_count(&mut self, count: usize) -> Result<()> {
        self.say(&format!("\n🌎 Total number of videos in our map: {}", count))
    }

    fn channel_extractor(&self, channel_id: &str, filter: &FilterArgs) -> Extractor {
        let listing = Arc::new(ChannelListing(self.youtube.clone()));
        Extractor::new(
            Box::new(ChannelSource::new(listing, channel_id)),
            VideoFilter::new(filter.period, filter.include_shorts, self.youtube.clone()),
        )
    }

    fn playlist_extractor(&self, playlist_id: &str, filter: &FilterArgs) -> Extractor {
        let listing = Arc::new(PlaylistListing(self.youtube.clone()));
        Extractor::new(
            Box::new(PlaylistSource::new(listing, playlist_id)),
            VideoFilter::new(filter.period, filter.include_shorts, self.youtube.clone()),
        )
    }

    fn credentials_path(&self) -> Result<&Path> {
        self.config.docs.credentials_path.as_deref().ok_or_else(|| {
            ScribeError::DocumentAccess(
                "No service account credentials configured (GOOGLE_DOCS_CREDENTIALS_PATH)".to_string(),
            )
            .into()
        })
    }

    async fn open_destination(&self, destination: Destination) -> Result<Box<dyn DocWriter>> {
        match destination {
            Destination::GoogleDoc(link) => {
                let writer = GoogleDocsWriter::connect(&link, self.credentials_path()?).await?;
                println!("Successfully connected to Google Docs.");
                Ok(Box::new(writer))
            }
            Destination::Word(dir) => {
                let dir = dir
                    .or_else(|| self.config.app.output_dir.clone())
                    .or_else(default_word_dir)
                    .context("Could not find a Desktop folder; pass --word-dir")?;
                Ok(Box::new(WordWriter::new(dir)))
            }
        }
    }

    /// Resolve command-line URLs, skipping the ones that fail
    async fn resolve_videos(&self, urls: &[String]) -> Vec<VideoRecord> {
        let extractor = SingleVideoExtractor::new(self.youtube.clone());
        let mut videos = Vec::with_capacity(urls.len());

        for url in urls {
            match extractor.get_video(url).await {
                Ok(Some(video)) => videos.push(video),
                Ok(None) => tracing::warn!("Could not retrieve video details for {}. Skipping.", url),
                Err(e) => tracing::warn!("Skipping {}: {:#}", url, e),
            }
        }

        videos
    }

    /// Process every accepted video of a channel or playlist, then save the document.
    ///
    /// A listing failure stops the walk; everything written so far is still saved before the
    /// error is returned.
    pub async fn process_extractor(
        &mut self,
        extractor: &Extractor,
        writer: &mut dyn DocWriter,
        options: &ProcessOptions,
    ) -> Result<usize> {
        self.say(
            "\n🛳️ Our vessel is blasting through this YouTube galaxy, capturing every video whisper in its path.\n\
             👀 Behold our conquered treasures below!\n",
        )?;

        let mut videos = extractor.videos();
        let mut count = 0;
        let mut failure = None;

        while let Some(next) = videos.next().await {
            match next {
                Ok(video) => {
                    self.process_video(&video, writer, options).await?;
                    count += 1;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        drop(videos);

        self.say(&format!("\n✅ Processed a total of {} videos.", count))?;
        writer.save().await?;

        if let Some(e) = failure {
            return Err(e.context(format!("Listing videos stopped after {} videos", count)));
        }

        self.say(&format!("🎉 {}", extractor.success_message()))?;
        self.say(&format!("🟢 Note: {}\n", extractor.sorting_note()))?;

        Ok(count)
    }

    /// Process user-picked videos in order, then save the document
    pub async fn process_videos(
        &mut self,
        videos: &[VideoRecord],
        writer: &mut dyn DocWriter,
        options: &ProcessOptions,
    ) -> Result<()> {
        self.say(
            "\n🛳️ Our vessel is blasting through this YouTube galaxy, capturing every video whisper in its path.\n\
             👀 Behold our conquered treasures below!\n",
        )?;

        for video in videos {
            self.process_video(video, writer, options).await?;
        }

        writer.save().await?;
        self.say(&format!("🎉 {}", SINGLE_VIDEO_SUCCESS))?;
        self.say(&format!("🟢 Note: {}\n", SINGLE_VIDEO_NOTE))?;
        Ok(())
    }

    /// Fetch, optionally transcribe and polish, and write one video.
    ///
    /// Only console I/O errors are returned; service and write failures are reported and the
    /// run continues.
    async fn process_video(
        &mut self,
        video: &VideoRecord,
        writer: &mut dyn DocWriter,
        options: &ProcessOptions,
    ) -> Result<()> {
        let title = video.display_title();
        let url = video.watch_url();
        match video.duration {
            Some(seconds) => self.say(&format!("{} ({})\n", style(title).bold(), format_duration(seconds)))?,
            None => self.say(&format!("{}\n", style(title).bold()))?,
        }

        let mut text = match self
            .ytdlp
            .fetch_captions(&url, &self.config.youtube.caption_languages)
            .await
        {
            Ok(captions) => captions,
            Err(e) => {
                tracing::warn!("Could not fetch captions for '{}': {:#}", title, e);
                None
            }
        };

        if text.is_none() {
            self.say("😯 Bummer! This video doesn't have a built-in transcript.")?;
            if self.wants_transcription(options.missing)? {
                text = self.transcribe(&url).await?;
            }
        }

        let text = match text {
            Some(text) if options.polish => self.polish(text).await?,
            Some(text) => text,
            None => NO_TRANSCRIPT_TEXT.to_string(),
        };

        if let Err(e) = writer.write_video(title, &text).await {
            self.say(&format!(
                "{} Failed to write text for video: {}. Reason: {:#}",
                style("Error:").red().bold(),
                title,
                e
            ))?;
        }

        Ok(())
    }

    fn wants_transcription(&mut self, missing: MissingTranscript) -> Result<bool> {
        if self.transcriber.is_none() {
            if missing != MissingTranscript::Never {
                self.say("Cannot transcribe: Hugging Face client is not configured.")?;
            }
            return Ok(false);
        }

        match missing {
            MissingTranscript::Never => Ok(false),
            MissingTranscript::Always => Ok(true),
            MissingTranscript::Ask => self.prompter.ask_yes_no(
                "Would you like our AI buddy to transcribe it for you? This can take a while. [y/n] ",
            ),
        }
    }

    async fn transcribe(&mut self, url: &str) -> Result<Option<String>> {
        let Some(transcriber) = &self.transcriber else {
            return Ok(None);
        };

        let progress = spinner("🔊 Transcribing audio... please be patient.", self.quiet);
        let result = transcriber.transcribe_video(url).await;
        progress.finish_and_clear();

        match result {
            Ok(text) => Ok(text),
            Err(e) => {
                self.say(&format!("Error during transcription: {:#}", e))?;
                Ok(None)
            }
        }
    }

    async fn polish(&mut self, text: String) -> Result<String> {
        let Some(polisher) = &self.polisher else {
            return Ok(text);
        };

        let progress = spinner("🤖 AI is polishing the text...", self.quiet);
        let result = polisher.polish(&text).await;
        progress.finish_and_clear();

        match result {
            Ok(Some(polished)) => Ok(polished),
            Ok(None) => {
                self.say("AI formatting failed. Using original transcript.")?;
                Ok(text)
            }
            Err(e) => {
                tracing::warn!("Gemini formatting failed: {:#}", e);
                self.say("AI formatting failed. Using original transcript.")?;
                Ok(text)
            }
        }
    }

    fn ask_polish(&mut self) -> Result<bool> {
        if self.polisher.is_none() {
            return Ok(false);
        }
        self.prompter.ask_yes_no(
            "\nWould you like our AI buddy to polish the final text (fix grammar, spelling, punctuation)?\n\
             This may take longer [y/n]: ",
        )
    }

    async fn ask_google_doc(&mut self) -> Result<Box<dyn DocWriter>> {
        let credentials = self.credentials_path()?.to_path_buf();
        loop {
            let link = self
                .prompter
                .ask("\nEnter a public Google Doc link with editor rights: ")?;
            match GoogleDocsWriter::connect(&link, &credentials).await {
                Ok(writer) => {
                    self.say("Successfully connected to Google Docs.")?;
                    return Ok(Box::new(writer));
                }
                Err(e) => self.say(&format!("Error: {:#}. Please try again.", e))?,
            }
        }
    }

    fn ask_word_dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = self.config.app.output_dir.clone().or_else(default_word_dir) {
            self.say(&format!("Defaulting to save on your Desktop: {}", dir.display()))?;
            return Ok(dir);
        }

        loop {
            let answer = self.prompter.ask(
                "\nCould not find Desktop. Where should we save it? Enter a valid directory path: ",
            )?;
            let dir = PathBuf::from(answer);
            if dir.is_dir() {
                return Ok(dir);
            }
            self.say("Uh-oh! That path went off the map. Let's try again!\n")?;
        }
    }

    fn ask_filter(&mut self) -> Result<FilterArgs> {
        let period: Period = self.prompter.ask_period()?;
        let include_shorts = self
            .prompter
            .ask_yes_no("\nWould you like to capture YouTube shorts? [y/n]\n")?;
        Ok(FilterArgs { period, include_shorts })
    }

    async fn ask_channel_extractor(&mut self) -> Result<Extractor> {
        let channel_id = loop {
            let answer = self.prompter.ask(
                "\nChannel ID can be found at About > Share Channel > Copy channel ID.\n\
                 Please enter a YouTube channel ID: ",
            )?;
            match self.youtube.channel_exists(&answer).await {
                Ok(true) => break answer,
                Ok(false) => self.say("Error: Invalid YouTube channel ID\n")?,
                Err(e) => self.say(&format!("Error: {:#}\n", e))?,
            }
        };

        let filter = self.ask_filter()?;
        Ok(self.channel_extractor(&channel_id, &filter))
    }

    async fn ask_playlist_extractor(&mut self) -> Result<Extractor> {
        let playlist_id = loop {
            let answer = self.prompter.ask(
                "\nA valid playlist URL starts with https://www.youtube.com/playlist?list=....\n\
                 Please enter a Youtube playlist URL: ",
            )?;
            let found = match playlist_id_from_url(&answer) {
                Some(id) => match self.youtube.playlist_exists(&id).await {
                    Ok(true) => Some(id),
                    Ok(false) => None,
                    Err(e) => {
                        tracing::warn!("Playlist lookup failed: {:#}", e);
                        None
                    }
                },
                None => None,
            };
            match found {
                Some(id) => break id,
                None => self.say("Error: Invalid YouTube playlist URL or ID not found.\n")?,
            }
        };

        let filter = self.ask_filter()?;
        Ok(self.playlist_extractor(&playlist_id, &filter))
    }

    async fn interactive_collection(
        &mut self,
        extractor: &Extractor,
        writer: &mut dyn DocWriter,
    ) -> Result<()> {
        self.say("\nStarting video processing. This may take a while for large channels...")?;
        let options = ProcessOptions {
            polish: self.ask_polish()?,
            missing: MissingTranscript::Ask,
        };
        self.process_extractor(extractor, writer, &options).await?;
        Ok(())
    }

    async fn interactive_single_videos(&mut self, writer: &mut dyn DocWriter) -> Result<()> {
        let extractor = SingleVideoExtractor::new(self.youtube.clone());
        let mut videos = Vec::new();

        loop {
            let url = self
                .prompter
                .ask("\nEnter a YouTube video URL (or 'done' to finish): ")?;
            if url.eq_ignore_ascii_case("done") {
                break;
            }

            match extractor.get_video(&url).await {
                Ok(Some(video)) => {
                    videos.push(video);
                    continue;
                }
                Ok(None) => {
                    self.say("Could not retrieve video details. It might be private or invalid.")?
                }
                Err(e) => self.say(&format!("An error occurred: {:#}", e))?,
            }

            if !self
                .prompter
                .ask_yes_no("\nWould you like to skip this video and try another? [y/n]\n")?
            {
                return Ok(());
            }
        }

        if videos.is_empty() {
            self.say("No videos were added to process.")?;
            return Ok(());
        }

        self.say_video_count(videos.len())?;
        let options = ProcessOptions {
            polish: self.ask_polish()?,
            missing: MissingTranscript::Ask,
        };
        self.process_videos(&videos, writer, &options).await
    }
}

fn command_options(output: &OutputArgs) -> ProcessOptions {
    ProcessOptions {
        polish: output.polish,
        missing: if output.transcribe_missing {
            MissingTranscript::Always
        } else {
            MissingTranscript::Never
        },
    }
}
