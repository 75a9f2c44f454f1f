use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, TextExtractor, VectorStore},
    Chunk, DocumentSource, DomainError, Preprocessor, VectorRecord, WordChunker,
};

/// Steps of one ingestion run. Any step can end the run in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionStage {
    Receive,
    ExtractText,
    Chunk,
    Embed,
    Upsert,
    Done,
}

impl fmt::Display for IngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Receive => "receive",
            Self::ExtractText => "extract_text",
            Self::Chunk => "chunk",
            Self::Embed => "embed",
            Self::Upsert => "upsert",
            Self::Done => "done",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// Windows produced by the chunker.
    pub chunks_total: usize,
    /// Distinct chunks written; repeats inside one document collapse.
    pub chunks_upserted: usize,
}

const DEFAULT_UPSERT_BATCH_SIZE: usize = 256;

pub struct IngestionService {
    extractor: Arc<dyn TextExtractor>,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    chunker: WordChunker,
    preprocessor: Preprocessor,
    upsert_batch_size: usize,
}

impl IngestionService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            extractor,
            embedding,
            vector_store,
            chunker: WordChunker::default(),
            preprocessor: Preprocessor::default(),
            upsert_batch_size: DEFAULT_UPSERT_BATCH_SIZE,
        }
    }

    pub fn with_chunker(mut self, chunker: WordChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn with_upsert_batch_size(mut self, size: usize) -> Self {
        self.upsert_batch_size = size.max(1);
        self
    }

    #[instrument(skip(self, source), fields(source = %source))]
    pub async fn ingest(&self, source: DocumentSource) -> Result<IngestionReport, DomainError> {
        tracing::debug!(stage = %IngestionStage::Receive, kind = source.kind());

        let text = self
            .extractor
            .extract(source)
            .await
            .map_err(|e| failed(IngestionStage::ExtractText, e))?;
        tracing::debug!(stage = %IngestionStage::ExtractText, chars = text.len());

        self.ingest_text(&text).await
    }

    /// Chunk, embed and store already extracted text.
    pub async fn ingest_text(&self, text: &str) -> Result<IngestionReport, DomainError> {
        let chunks = self.chunker.chunks(text);
        let chunks_total = chunks.len();

        let mut seen = HashSet::with_capacity(chunks_total);
        let chunks: Vec<Chunk> = chunks
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        tracing::debug!(
            stage = %IngestionStage::Chunk,
            total = chunks_total,
            distinct = chunks.len()
        );

        let inputs: Vec<_> = chunks
            .iter()
            .map(|c| self.preprocessor.apply(&c.text))
            .collect();
        let inputs: Vec<&str> = inputs.iter().map(|s| &**s).collect();
        let embeddings = self
            .embedding
            .embed_batch(&inputs)
            .await
            .map_err(|e| failed(IngestionStage::Embed, e))?;
        if embeddings.len() != chunks.len() {
            return Err(failed(
                IngestionStage::Embed,
                DomainError::internal(format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    embeddings.len()
                )),
            ));
        }
        tracing::debug!(stage = %IngestionStage::Embed, count = embeddings.len());

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord::new(chunk, embedding))
            .collect();
        for batch in records.chunks(self.upsert_batch_size) {
            self.vector_store
                .upsert(batch)
                .await
                .map_err(|e| failed(IngestionStage::Upsert, e))?;
        }

        let report = IngestionReport {
            chunks_total,
            chunks_upserted: records.len(),
        };
        tracing::info!(
            stage = %IngestionStage::Done,
            chunks_total = report.chunks_total,
            chunks_upserted = report.chunks_upserted,
            "document ingested"
        );
        Ok(report)
    }
}

fn failed(stage: IngestionStage, error: DomainError) -> DomainError {
    tracing::error!(%stage, error = %error, "ingestion failed");
    error
}
