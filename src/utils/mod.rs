use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Format a video length in human-readable format
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Hide all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

/// Spinner for long-running steps; hidden when `quiet` is set
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        progress.set_style(style);
    }
    progress.set_message(message.into());
    progress.enable_steady_tick(std::time::Duration::from_millis(120));
    progress
}

/// Check if a file exists and is readable
pub fn check_file_accessible(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    // Try to read metadata to check permissions
    fs_err::metadata(path)?;

    Ok(())
}

/// Check if the current environment has required tools
pub async fn check_dependencies(ytdlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(ytdlp_path).await {
        missing.push("yt-dlp - required for captions and audio downloads".to_string());
    }

    // yt-dlp needs ffmpeg to convert audio for speech recognition
    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required for transcribing videos without captions".to_string());
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3661), "1h 1m 1s");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AIzaSyABCDEF1234"), "************1234");
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_check_file_accessible() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("credentials.json");
        fs_err::write(&file, "{}").unwrap();

        assert!(check_file_accessible(&file).is_ok());
        assert!(check_file_accessible(dir.path()).is_err());
        assert!(check_file_accessible(&dir.path().join("missing.json")).is_err());
    }

    #[tokio::test]
    async fn test_missing_command_is_reported_unavailable() {
        assert!(!check_command_available("definitely-not-a-real-command-4821").await);
    }
}
