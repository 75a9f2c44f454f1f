//! Turning uploaded files and web pages into plain text.

mod file;
mod html;

use async_trait::async_trait;

use crate::domain::{ports::TextExtractor, DocumentSource, DomainError, FileKind};

use file::extract_file;
use html::visible_text;

pub struct DocumentTextExtractor {
    http: reqwest::Client,
}

impl DocumentTextExtractor {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetches `url` once; non-success statuses are errors.
    pub async fn fetch_page(&self, url: &str) -> Result<String, DomainError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::external(format!("failed to fetch {url}: {e}")))?
            .error_for_status()
            .map_err(|e| DomainError::external(format!("failed to fetch {url}: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| DomainError::external(format!("failed to read {url}: {e}")))
    }
}

impl Default for DocumentTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(&self, source: DocumentSource) -> Result<String, DomainError> {
        match source {
            DocumentSource::File { filename, bytes } => {
                let kind = FileKind::from_filename(filename.as_deref());
                tracing::debug!(?kind, bytes = bytes.len(), "extracting file");
                tokio::task::spawn_blocking(move || extract_file(kind, &bytes))
                    .await
                    .map_err(|e| DomainError::internal(e.to_string()))?
            }
            DocumentSource::Url(url) => {
                let html = self.fetch_page(&url).await?;
                Ok(visible_text(&html))
            }
        }
    }
}
