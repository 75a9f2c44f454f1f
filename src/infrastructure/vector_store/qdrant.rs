use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, ScoredPoint, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{ports::VectorStore, DomainError, Embedding, ScoredRecord, VectorRecord};
use crate::infrastructure::embedding::check_dimension;

pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub async fn new(
        url: &str,
        api_key: Option<String>,
        collection: &str,
        dimension: usize,
    ) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
            tracing::info!(
                collection = %self.collection,
                dimension = self.dimension,
                "created collection"
            );
        }

        Ok(())
    }
}

/// Qdrant only accepts integers or UUIDs as point ids, so the hex content
/// hash is folded into a UUID from its first 16 bytes.
pub(crate) fn point_id(record_id: &str) -> Uuid {
    let digest = match hex::decode(record_id) {
        Ok(bytes) if bytes.len() >= 16 => bytes,
        _ => Sha256::digest(record_id.as_bytes()).to_vec(),
    };
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(raw)
}

fn to_point(record: &VectorRecord, dimension: usize) -> Result<PointStruct, DomainError> {
    check_dimension(&record.embedding, dimension)?;

    let payload: Payload = serde_json::json!({
        "chunk_id": record.id,
        "text": record.text,
    })
    .try_into()
    .map_err(|_| DomainError::internal("Failed to create payload"))?;

    Ok(PointStruct::new(
        point_id(&record.id).to_string(),
        record.embedding.as_slice().to_vec(),
        payload,
    ))
}

/// Hits without a text payload were not written by this service and are skipped.
fn to_scored(point: ScoredPoint) -> Option<ScoredRecord> {
    let payload = point.payload;
    let text = payload.get("text")?.as_str()?.to_string();
    let id = payload
        .get("chunk_id")
        .and_then(|v| v.as_str())
        .cloned()
        .unwrap_or_default();

    Some(ScoredRecord {
        id,
        text,
        score: point.score,
    })
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), DomainError> {
        if records.is_empty() {
            return Ok(());
        }

        let points = records
            .iter()
            .map(|record| to_point(record, self.dimension))
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        vector: &Embedding,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, DomainError> {
        check_dimension(vector, self.dimension)?;

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let records = results.result.into_iter().filter_map(to_scored).collect();

        Ok(records)
    }

    async fn health(&self) -> Result<(), DomainError> {
        self.client
            .health_check()
            .await
            .map(|_| ())
            .map_err(|e| DomainError::external(e.to_string()))
    }
}
