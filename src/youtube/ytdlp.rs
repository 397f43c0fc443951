use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

use crate::Result;

/// Thin wrapper around the `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: String,
}

impl YtDlp {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Download the audio track of a video as MP3 to `output_path`
    pub async fn download_audio(&self, url: &str, output_path: &Path) -> Result<()> {
        tracing::debug!("Downloading audio for: {}", url);

        let output_arg = output_path.to_string_lossy();
        let output = Command::new(&self.path)
            .args([
                "--output",
                &*output_arg,
                // Transcription does not need more than the smallest audio stream
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "9",
                "--format",
                "worstaudio[acodec^=mp4a]/worstaudio[ext=m4a]/worstaudio[ext=mp3]/worstaudio",
                "--no-playlist",
                "--concurrent-fragments",
                "4",
                "--newline",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to download audio: {}", error.trim());
        }

        if !output_path.exists() {
            anyhow::bail!(
                "yt-dlp finished but no audio file was written to {}",
                output_path.display()
            );
        }

        Ok(())
    }

    /// Fetch the captions of a video as plain text.
    ///
    /// Manually uploaded and automatic captions are both considered; `languages` is in order
    /// of preference. Returns `Ok(None)` when the video has no captions in any of them.
    pub async fn fetch_captions(&self, url: &str, languages: &[String]) -> Result<Option<String>> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
        let template = temp_dir.path().join("%(id)s.%(ext)s");

        let template_arg = template.to_string_lossy();
        let languages_arg = languages.join(",");

        tracing::debug!("Fetching captions ({}) for: {}", languages_arg, url);

        let output = Command::new(&self.path)
            .args([
                "--skip-download",
                "--write-sub",
                "--write-auto-sub",
                "--sub-lang",
                languages_arg.as_str(),
                "--sub-format",
                "vtt",
                "--no-playlist",
                "--no-warnings",
                "--output",
                &*template_arg,
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed to fetch captions: {}", error.trim());
        }

        let files: Vec<PathBuf> = fs_err::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "vtt"))
            .collect();

        let Some(path) = pick_caption_file(&files, languages) else {
            return Ok(None);
        };

        let vtt = fs_err::read_to_string(path)?;
        let text = vtt_to_text(&vtt);

        Ok((!text.is_empty()).then_some(text))
    }
}

/// Pick the caption file of the most preferred language (files are named `<id>.<lang>.vtt`)
fn pick_caption_file<'a>(files: &'a [PathBuf], languages: &[String]) -> Option<&'a PathBuf> {
    let language_of = |path: &PathBuf| {
        path.file_stem()
            .and_then(|stem| Path::new(stem).extension())
            .map(|lang| lang.to_string_lossy().into_owned())
    };

    languages
        .iter()
        .find_map(|wanted| {
            files
                .iter()
                .find(|file| language_of(file).as_deref() == Some(wanted.as_str()))
        })
        .or_else(|| files.first())
}

/// Convert WebVTT captions into a single line of text.
///
/// Timing lines, headers, cue numbers and inline tags are dropped. Automatic captions repeat
/// the previous line at the top of every cue, so a line equal to the last kept line is skipped.
pub fn vtt_to_text(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for raw in vtt.lines() {
        let line = raw.trim();

        if line.is_empty()
            || line.starts_with("WEBVTT")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.starts_with("NOTE")
            || line.contains("-->")
            || line.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }

        let cleaned = decode_entities(&strip_tags(line));
        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() || lines.last() == Some(&cleaned) {
            continue;
        }

        lines.push(cleaned);
    }

    lines.join(" ")
}

fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;

    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
