use anyhow::Context;
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use super::DocWriter;
use crate::utils::check_file_accessible;
use crate::{Result, ScribeError};

pub const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1";

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive",
];

/// New sections go to the top of the body
const INSERTION_INDEX: usize = 1;

/// Writes transcripts into an existing Google Doc, newest section first
pub struct GoogleDocsWriter {
    http: Client,
    auth: Arc<dyn TokenProvider>,
    document_id: String,
    base_url: String,
}

impl GoogleDocsWriter {
    /// Authenticate with a service account and check that the document is reachable
    pub async fn connect(link: &str, credentials_path: &Path) -> Result<Self> {
        let document_id = document_id_from_link(link).ok_or_else(|| {
            ScribeError::DocumentAccess(
                "Invalid Google Doc link. Could not extract Document ID.".to_string(),
            )
        })?;

        check_file_accessible(credentials_path)
            .map_err(|e| ScribeError::DocumentAccess(format!("{:#}", e)))?;

        let service_account = CustomServiceAccount::from_file(credentials_path).map_err(|e| {
            ScribeError::DocumentAccess(format!(
                "Failed to load service account {}: {}",
                credentials_path.display(),
                e
            ))
        })?;

        let http = Client::builder()
            .user_agent(concat!("yt-scribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let writer = Self {
            http,
            auth: Arc::new(service_account),
            document_id,
            base_url: DOCS_API_BASE.to_string(),
        };

        writer.verify_access().await?;
        tracing::info!(document_id = %writer.document_id, "Connected to Google Docs");

        Ok(writer)
    }

    async fn bearer_token(&self) -> Result<String> {
        let token = self
            .auth
            .token(SCOPES)
            .await
            .map_err(|e| ScribeError::DocumentAccess(format!("Authentication failed: {}", e)))?;
        Ok(token.as_str().to_string())
    }

    async fn verify_access(&self) -> Result<()> {
        let url = format!("{}/documents/{}", self.base_url, self.document_id);
        let token = self.bearer_token().await?;

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("fields", "documentId")])
            .send()
            .await
            .context("Google Docs request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScribeError::DocumentAccess(format!(
                "Cannot access Google Doc. Check link and permissions. HTTP {}: {}",
                status,
                body.trim()
            ))
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl DocWriter for GoogleDocsWriter {
    async fn write_video(&mut self, title: &str, content: &str) -> Result<()> {
        let url = format!("{}/documents/{}:batchUpdate", self.base_url, self.document_id);
        let token = self.bearer_token().await?;

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "requests": insert_video_requests(title, content) }))
            .send()
            .await
            .context("Google Docs request failed")?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if is_too_long_error(&body) {
            tracing::warn!(
                "Content for '{}' is too long for a single Google Docs request and was skipped.",
                title
            );
            return Ok(());
        }

        anyhow::bail!("Google Docs update failed: HTTP {}: {}", status, body.trim())
    }

    async fn save(&mut self) -> Result<()> {
        println!("Google Doc has been updated.");
        Ok(())
    }
}

/// Extract the document id from the `/d/<id>/` segment of a Docs link
pub fn document_id_from_link(link: &str) -> Option<String> {
    let (_, rest) = link.split_once("/d/")?;
    let id = rest.split(['/', '?', '#']).next().unwrap_or_default().trim();

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Length in UTF-16 code units, which is how the Docs API indexes text
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Requests that insert a heading plus body at the top of the document
pub fn insert_video_requests(title: &str, content: &str) -> Vec<Value> {
    let title_start = INSERTION_INDEX;
    let title_end = title_start + utf16_len(title);
    // Skip the newline that ends the heading
    let body_start = title_end + 1;
    let body_end = body_start + utf16_len(content);

    vec![
        json!({
            "insertText": {
                "location": { "index": INSERTION_INDEX },
                "text": format!("{}\n{}\n\n", title, content)
            }
        }),
        json!({
            "updateParagraphStyle": {
                "range": { "startIndex": title_start, "endIndex": title_end },
                "paragraphStyle": { "namedStyleType": "HEADING_1" },
                "fields": "namedStyleType"
            }
        }),
        json!({
            "updateTextStyle": {
                "range": { "startIndex": title_start, "endIndex": title_end },
                "textStyle": { "bold": true, "fontSize": { "magnitude": 14, "unit": "PT" } },
                "fields": "bold,fontSize"
            }
        }),
        json!({
            "updateParagraphStyle": {
                "range": { "startIndex": body_start, "endIndex": body_end },
                "paragraphStyle": { "namedStyleType": "NORMAL_TEXT" },
                "fields": "namedStyleType"
            }
        }),
        json!({
            "updateTextStyle": {
                "range": { "startIndex": body_start, "endIndex": body_end },
                "textStyle": { "bold": false, "fontSize": { "magnitude": 11, "unit": "PT" } },
                "fields": "bold,fontSize"
            }
        }),
    ]
}

fn is_too_long_error(body: &str) -> bool {
    body.contains("INVALID_ARGUMENT") && body.contains("exceeds the maximum")
}
