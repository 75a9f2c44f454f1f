use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DomainError, Embedding, ScoredRecord, VectorRecord};
use crate::infrastructure::embedding::check_dimension;

pub struct InMemoryVectorStore {
    dimension: usize,
    records: RwLock<HashMap<String, (Embedding, String)>>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), DomainError> {
        if records.is_empty() {
            return Ok(());
        }

        for record in records {
            check_dimension(&record.embedding, self.dimension)?;
        }

        let mut store = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for record in records {
            store.insert(
                record.id.clone(),
                (record.embedding.clone(), record.text.clone()),
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &Embedding,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, DomainError> {
        check_dimension(vector, self.dimension)?;

        let store = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<ScoredRecord> = store
            .iter()
            .map(|(id, (embedding, text))| ScoredRecord {
                id: id.clone(),
                text: text.clone(),
                score: vector.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn health(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
