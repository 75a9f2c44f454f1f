//! Port stubs shared by unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::{
    ports::{EmbeddingService, LlmService, Transcriber, VectorStore},
    DomainError, Embedding, ScoredRecord, VectorRecord,
};

/// Bag-of-words hashing embedder: texts sharing words score as similar.
pub struct StubEmbedding {
    dimension: usize,
    fail: bool,
    seen: Mutex<Vec<String>>,
}

impl StubEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(dimension: usize) -> Self {
        Self {
            fail: true,
            ..Self::new(dimension)
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    fn vector(&self, text: &str) -> Embedding {
        let mut vec = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            let digest = Sha256::digest(word.to_lowercase().as_bytes());
            vec[digest[0] as usize % self.dimension] += 1.0;
        }
        Embedding::new(vec)
    }
}

#[async_trait]
impl EmbeddingService for StubEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        if self.fail {
            return Err(DomainError::external("embedding service unavailable"));
        }
        self.seen.lock().unwrap().push(text.to_string());
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

pub struct StubLlm {
    reply: Option<String>,
    delay: Duration,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply
            .clone()
            .ok_or_else(|| DomainError::external("connection refused"))
    }
}

pub struct StubTranscriber {
    result: Result<String, String>,
}

impl StubTranscriber {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err("upstream rejected audio".to_string()),
        }
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, DomainError> {
        self.result.clone().map_err(DomainError::transcription)
    }
}

pub struct FailingVectorStore;

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn upsert(&self, _records: &[VectorRecord]) -> Result<(), DomainError> {
        Err(DomainError::external("vector store unreachable"))
    }

    async fn query(
        &self,
        _vector: &Embedding,
        _top_k: usize,
    ) -> Result<Vec<ScoredRecord>, DomainError> {
        Err(DomainError::external("vector store unreachable"))
    }

    async fn health(&self) -> Result<(), DomainError> {
        Err(DomainError::external("vector store unreachable"))
    }
}

/// Accepts everything and remembers the size of each upsert call.
#[derive(Default)]
pub struct RecordingVectorStore {
    batches: Mutex<Vec<usize>>,
}

impl RecordingVectorStore {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for RecordingVectorStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), DomainError> {
        self.batches.lock().unwrap().push(records.len());
        Ok(())
    }

    async fn query(
        &self,
        _vector: &Embedding,
        _top_k: usize,
    ) -> Result<Vec<ScoredRecord>, DomainError> {
        Ok(Vec::new())
    }

    async fn health(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
