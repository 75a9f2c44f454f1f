use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use rig::prelude::TranscriptionClient;
use rig::providers::openai;
use rig::transcription::TranscriptionModel;

use crate::domain::{ports::Transcriber, DomainError};
use crate::infrastructure::config::TranscriptionConfig;

/// Speech-to-text through the OpenAI transcription endpoint.
pub struct WhisperTranscriber {
    model: openai::TranscriptionModel,
    model_name: String,
    file_suffix: String,
    temp_dir: Option<PathBuf>,
}

impl WhisperTranscriber {
    pub fn new(client: &openai::Client, config: &TranscriptionConfig) -> Self {
        Self {
            model: client.transcription_model(&config.model),
            model_name: config.model.clone(),
            file_suffix: config.file_suffix.clone(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// The audio goes through a named temporary file that is removed when it
    /// drops, on success and on every error path.
    fn spool(&self, audio: &[u8]) -> Result<tempfile::NamedTempFile, DomainError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("rag-audio-").suffix(&self.file_suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file =
            file.map_err(|e| DomainError::internal(format!("failed to create temp file: {e}")))?;

        file.write_all(audio)
            .and_then(|()| file.flush())
            .map_err(|e| DomainError::internal(format!("failed to write audio: {e}")))?;
        Ok(file)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, DomainError> {
        let file = self.spool(audio)?;

        let response = self
            .model
            .transcription_request()
            .load_file(file.path())
            .send()
            .await
            .map_err(|e| DomainError::transcription(e.to_string()))?;

        tracing::debug!(
            model = %self.model_name,
            bytes = audio.len(),
            chars = response.text.len(),
            "audio transcribed"
        );
        Ok(response.text)
    }
}
