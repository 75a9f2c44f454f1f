use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingModel;
use rig::providers::openai;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// OpenAI embeddings, truncated server-side to the configured dimension.
pub struct TextEmbedding {
    model: openai::EmbeddingModel,
    model_name: String,
    dimension: usize,
    batch_size: usize,
}

impl TextEmbedding {
    pub fn new(client: &openai::Client, config: &EmbeddingConfig) -> Self {
        Self {
            model: client.embedding_model_with_ndims(&config.model, config.dimension),
            model_name: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
        }
    }

    fn convert(&self, vec: Vec<f64>) -> Result<Embedding, DomainError> {
        let embedding: Embedding = vec.into_iter().map(|x| x as f32).collect::<Vec<_>>().into();
        check_dimension(&embedding, self.dimension)?;
        Ok(embedding)
    }
}

/// All vectors in the index share one dimension; anything else is a
/// misconfigured model, not bad input.
pub fn check_dimension(embedding: &Embedding, expected: usize) -> Result<(), DomainError> {
    if embedding.dimension() != expected {
        return Err(DomainError::configuration(format!(
            "embedding dimension mismatch: expected {expected}, got {}",
            embedding.dimension()
        )));
    }
    Ok(())
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let embedding = self
            .model
            .embed_text(text)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        self.convert(embedding.vec)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embeddings = self
                .model
                .embed_texts(batch.iter().map(|t| t.to_string()))
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;

            if embeddings.len() != batch.len() {
                return Err(DomainError::external(format!(
                    "embedding provider returned {} vectors for {} inputs",
                    embeddings.len(),
                    batch.len()
                )));
            }

            for embedding in embeddings {
                out.push(self.convert(embedding.vec)?);
            }
        }

        tracing::debug!(model = %self.model_name, count = out.len(), "embedded batch");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Answers `/embeddings` with one `dimension`-long vector per input,
    /// or with `count` vectors when set.
    struct EmbeddingsReply {
        dimension: usize,
        count: Option<usize>,
    }

    impl Respond for EmbeddingsReply {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            let inputs = body["input"].as_array().map_or(1, Vec::len);
            let data: Vec<Value> = (0..self.count.unwrap_or(inputs))
                .map(|i| {
                    json!({
                        "object": "embedding",
                        "embedding": vec![0.5f64; self.dimension],
                        "index": i,
                    })
                })
                .collect();

            ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": data,
                "model": "text-embedding-3-small",
                "usage": { "prompt_tokens": 1, "total_tokens": 1 },
            }))
        }
    }

    async fn server_replying(dimension: usize, count: Option<usize>) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EmbeddingsReply { dimension, count })
            .mount(&server)
            .await;
        server
    }

    fn embedder(server: &MockServer, dimension: usize, batch_size: usize) -> TextEmbedding {
        let client = openai::Client::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .build()
            .unwrap();
        let config = EmbeddingConfig {
            dimension,
            batch_size,
            ..EmbeddingConfig::default()
        };
        TextEmbedding::new(&client, &config)
    }

    async fn request_sizes(server: &MockServer) -> Vec<usize> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| {
                let body: Value = serde_json::from_slice(&r.body).unwrap();
                body["input"].as_array().map_or(0, Vec::len)
            })
            .collect()
    }

    #[test]
    fn test_check_dimension() {
        let embedding = Embedding::new(vec![0.0; 384]);
        assert!(check_dimension(&embedding, 384).is_ok());
        assert!(matches!(
            check_dimension(&embedding, 768),
            Err(DomainError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_embed_batch_splits_by_batch_size() {
        let server = server_replying(8, None).await;
        let texts = ["a", "b", "c", "d", "e", "f", "g"];

        let vectors = embedder(&server, 8, 3).embed_batch(&texts).await.unwrap();

        assert_eq!(vectors.len(), 7);
        assert!(vectors.iter().all(|v| v.dimension() == 8));
        assert_eq!(request_sizes(&server).await, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_embed_batch_sends_requested_dimension() {
        let server = server_replying(8, None).await;

        embedder(&server, 8, 64).embed_batch(&["a"]).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["dimensions"], 8);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let server = server_replying(8, None).await;

        let vectors = embedder(&server, 8, 3).embed_batch(&[]).await.unwrap();

        assert!(vectors.is_empty());
        assert!(request_sizes(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_dimension_from_provider_is_configuration_error() {
        let server = server_replying(768, None).await;
        let embedding = embedder(&server, 384, 64);

        assert!(matches!(
            embedding.embed("hello").await,
            Err(DomainError::Configuration(_))
        ));
        assert!(matches!(
            embedding.embed_batch(&["a", "b"]).await,
            Err(DomainError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_vectors_are_external_error() {
        let server = server_replying(8, Some(1)).await;

        let err = embedder(&server, 8, 64)
            .embed_batch(&["a", "b", "c"])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ExternalService(_)));
    }

    #[tokio::test]
    async fn test_provider_error_is_external_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = embedder(&server, 8, 64).embed("hello").await.unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
    }
}
