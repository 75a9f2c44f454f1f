use serde::{Deserialize, Serialize};

use super::{Chunk, Embedding};

/// The unit written to the vector index: id, vector and `{text}` metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Embedding,
    pub text: String,
}

impl VectorRecord {
    pub fn new(chunk: Chunk, embedding: Embedding) -> Self {
        Self {
            id: chunk.id,
            embedding,
            text: chunk.text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub text: String,
    pub score: f32,
}
