use anyhow::Context;
use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use std::path::{Path, PathBuf};

use super::DocWriter;
use crate::Result;

const BASE_NAME: &str = "YT_Captions";
const HEADING_STYLE: &str = "Heading1";

/// Collects transcripts into a new `.docx` file
pub struct WordWriter {
    storage_dir: PathBuf,
    entries: Vec<(String, String)>,
    saved_path: Option<PathBuf>,
}

impl WordWriter {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            entries: Vec::new(),
            saved_path: None,
        }
    }

    /// Path of the last saved document
    pub fn saved_path(&self) -> Option<&Path> {
        self.saved_path.as_deref()
    }

    /// Write the collected entries to the first free `YT_Captions*.docx` name
    pub fn save_document(&self) -> Result<PathBuf> {
        fs_err::create_dir_all(&self.storage_dir)?;
        let path = next_available_path(&self.storage_dir);

        let mut docx = Docx::new().add_style(
            Style::new(HEADING_STYLE, StyleType::Paragraph)
                .name("Heading 1")
                .bold()
                .size(28),
        );

        for (title, content) in &self.entries {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .style(HEADING_STYLE)
                    .add_run(Run::new().add_text(title.as_str())),
            );
            for line in content.lines() {
                docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
            }
            docx = docx.add_paragraph(Paragraph::new());
        }

        let file = fs_err::File::create(&path)?;
        docx.build()
            .pack(file)
            .with_context(|| format!("Failed to write Word document {}", path.display()))?;

        Ok(path)
    }
}

#[async_trait]
impl DocWriter for WordWriter {
    async fn write_video(&mut self, title: &str, content: &str) -> Result<()> {
        self.entries.push((clean_text(title), clean_text(content)));
        Ok(())
    }

    async fn save(&mut self) -> Result<()> {
        let path = self.save_document()?;
        println!("\n📁 Saved results to {}", path.display());
        self.saved_path = Some(path);
        Ok(())
    }
}

/// Remove characters Word cannot store, keeping line breaks and tabs
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

/// `YT_Captions.docx`, or `YT_Captions (n).docx` with the smallest free `n`
pub fn next_available_path(dir: &Path) -> PathBuf {
    let first = dir.join(format!("{}.docx", BASE_NAME));
    if !first.exists() {
        return first;
    }

    (1..)
        .map(|n| dir.join(format!("{} ({}).docx", BASE_NAME, n)))
        .find(|path| !path.exists())
        .unwrap_or(first)
}

/// The user's Desktop, falling back to a OneDrive-synced one
pub fn default_word_dir() -> Option<PathBuf> {
    let home = dirs::home_dir()?;

    [home.join("Desktop"), home.join("OneDrive").join("Desktop")]
        .into_iter()
        .find(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_control_characters() {
        assert_eq!(clean_text("a\u{0}b\u{7}c\u{1b}"), "abc");
        assert_eq!(clean_text("line one\nline\ttwo\r\n"), "line one\nline\ttwo\r\n");
        assert_eq!(clean_text("Xin chào 👋"), "Xin chào 👋");
    }

    #[test]
    fn test_next_available_path_counts_up() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_available_path(dir.path()), dir.path().join("YT_Captions.docx"));

        fs_err::write(dir.path().join("YT_Captions.docx"), b"").unwrap();
        fs_err::write(dir.path().join("YT_Captions (1).docx"), b"").unwrap();

        assert_eq!(
            next_available_path(dir.path()),
            dir.path().join("YT_Captions (2).docx")
        );
    }

    #[tokio::test]
    async fn test_save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = WordWriter::new(dir.path());
        first.write_video("First talk", "Hello\nworld").await.unwrap();
        first.save().await.unwrap();

        let mut second = WordWriter::new(dir.path());
        second.write_video("Second talk", "Again").await.unwrap();
        second.save().await.unwrap();

        assert_eq!(first.saved_path(), Some(dir.path().join("YT_Captions.docx").as_path()));
        assert_eq!(
            second.saved_path(),
            Some(dir.path().join("YT_Captions (1).docx").as_path())
        );
        assert!(fs_err::metadata(dir.path().join("YT_Captions (1).docx")).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_write_video_cleans_entries() {
        let mut writer = WordWriter::new("/unused");
        writer.write_video("Title\u{0}", "Body\u{8}").await.unwrap();

        assert_eq!(writer.entries, [("Title".to_string(), "Body".to_string())]);
    }
}
