use std::sync::Arc;

use tracing::instrument;

use super::rag::AnswerGenerator;
use crate::domain::{
    ports::{EmbeddingService, Transcriber},
    Answer, DomainError, Preprocessor, QueryInput,
};

pub struct QueryService {
    transcriber: Arc<dyn Transcriber>,
    embedding: Arc<dyn EmbeddingService>,
    generator: Arc<AnswerGenerator>,
    preprocessor: Preprocessor,
}

impl QueryService {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        embedding: Arc<dyn EmbeddingService>,
        generator: Arc<AnswerGenerator>,
    ) -> Self {
        Self {
            transcriber,
            embedding,
            generator,
            preprocessor: Preprocessor::default(),
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Resolves the question text, embeds it and hands it to the generator.
    ///
    /// Errors only for unusable input (`Validation`), failed transcription
    /// (`Transcription`) or a failed query embedding. Retrieval and
    /// generation problems come back as a degraded `Answer`.
    #[instrument(skip(self, input))]
    pub async fn handle(&self, input: QueryInput) -> Result<Answer, DomainError> {
        let question = self.resolve_question(input).await?;

        let embedding_input = self.preprocessor.apply(&question);
        let vector = self.embedding.embed(&embedding_input).await?;

        Ok(self.generator.answer(&vector, &question).await)
    }

    async fn resolve_question(&self, input: QueryInput) -> Result<String, DomainError> {
        match input {
            QueryInput::Audio(audio) => {
                let text = self.transcriber.transcribe(&audio).await.map_err(|e| {
                    tracing::error!(error = %e, bytes = audio.len(), "transcription failed");
                    e
                })?;

                let text = text.trim();
                if text.is_empty() {
                    tracing::warn!(bytes = audio.len(), "transcription returned no text");
                    return Err(DomainError::transcription("empty transcript"));
                }
                tracing::debug!(question = %text, "transcribed query");
                Ok(text.to_string())
            }
            QueryInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(DomainError::validation("Empty text received"));
                }
                Ok(text.to_string())
            }
        }
    }
}
