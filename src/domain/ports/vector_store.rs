use crate::domain::{errors::DomainError, Embedding, ScoredRecord, VectorRecord};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Writes records, overwriting any with the same id. Empty input is a no-op.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), DomainError>;

    /// Nearest records by cosine similarity, best first.
    async fn query(&self, vector: &Embedding, top_k: usize)
        -> Result<Vec<ScoredRecord>, DomainError>;

    async fn health(&self) -> Result<(), DomainError>;
}
