use crate::domain::{errors::DomainError, DocumentSource};
use async_trait::async_trait;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, source: DocumentSource) -> Result<String, DomainError>;
}
