use std::sync::Arc;
use std::time::Duration;

use crate::application::{AnswerGenerator, IngestionService, QueryService};
use crate::domain::{
    ports::{EmbeddingService, LlmService, TextExtractor, Transcriber, VectorStore},
    Preprocessor, WordChunker,
};
use crate::infrastructure::clients::{anthropic_client, openai_client};
use crate::infrastructure::{
    AnthropicLlm, AppConfig, Credentials, DocumentTextExtractor, InMemoryVectorStore,
    LlmProvider, OpenAiLlm, QdrantVectorStore, TextEmbedding, VectorStoreProvider,
    WhisperTranscriber,
};

/// Services shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionService>,
    pub query: Arc<QueryService>,
    pub vector_store: Arc<dyn VectorStore>,
    pub config: Arc<AppConfig>,
}

/// Concrete adapters behind the ports, so tests can swap any of them.
pub struct Adapters {
    pub extractor: Arc<dyn TextExtractor>,
    pub embedding: Arc<dyn EmbeddingService>,
    pub vector_store: Arc<dyn VectorStore>,
    pub llm: Arc<dyn LlmService>,
    pub transcriber: Arc<dyn Transcriber>,
}

impl Adapters {
    /// Connects to the configured providers with already validated credentials.
    pub async fn connect(config: &AppConfig, credentials: &Credentials) -> anyhow::Result<Self> {
        let cfg = &config.config;
        let openai = openai_client(credentials)?;

        let vector_store: Arc<dyn VectorStore> = match cfg.vector_store.provider {
            VectorStoreProvider::Qdrant => Arc::new(
                QdrantVectorStore::new(
                    &cfg.vector_store.url,
                    credentials.qdrant_api_key.clone(),
                    &cfg.vector_store.collection,
                    cfg.embedding.dimension,
                )
                .await?,
            ),
            VectorStoreProvider::InMemory => {
                tracing::warn!("using in-memory vector store, data is lost on restart");
                Arc::new(InMemoryVectorStore::new(cfg.embedding.dimension))
            }
        };

        let llm: Arc<dyn LlmService> = match cfg.llm.provider {
            LlmProvider::OpenAi => Arc::new(OpenAiLlm::new(
                openai.clone(),
                &cfg.llm.model,
                cfg.llm.max_tokens,
            )),
            LlmProvider::Anthropic => Arc::new(AnthropicLlm::new(
                anthropic_client(credentials)?,
                &cfg.llm.model,
                cfg.llm.max_tokens,
            )),
        };

        Ok(Self {
            extractor: Arc::new(DocumentTextExtractor::new()),
            embedding: Arc::new(TextEmbedding::new(&openai, &cfg.embedding)),
            vector_store,
            llm,
            transcriber: Arc::new(WhisperTranscriber::new(&openai, &cfg.transcription)),
        })
    }
}

impl AppState {
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let credentials = Credentials::from_env(&config.config)?;
        let adapters = Adapters::connect(&config, &credentials).await?;
        Ok(Self::new(config, adapters)?)
    }

    pub fn new(config: AppConfig, adapters: Adapters) -> crate::domain::Result<Self> {
        let cfg = &config.config;
        let chunker = WordChunker::new(cfg.chunking.chunk_size, cfg.chunking.overlap)?;
        let preprocessor = Preprocessor::new(
            cfg.preprocessing.remove_stopwords,
            cfg.preprocessing.lowercase,
        );

        let ingestion = IngestionService::new(
            adapters.extractor,
            adapters.embedding.clone(),
            adapters.vector_store.clone(),
        )
        .with_chunker(chunker)
        .with_preprocessor(preprocessor)
        .with_upsert_batch_size(cfg.vector_store.upsert_batch_size);

        let generator = AnswerGenerator::new(
            adapters.vector_store.clone(),
            adapters.llm,
            config.prompts.rag.clone(),
            cfg.rag.top_k,
        )
        .with_timeout(Duration::from_secs(cfg.llm.timeout_seconds));

        let query = QueryService::new(
            adapters.transcriber,
            adapters.embedding,
            Arc::new(generator),
        )
        .with_preprocessor(preprocessor);

        Ok(Self {
            ingestion: Arc::new(ingestion),
            query: Arc::new(query),
            vector_store: adapters.vector_store,
            config: Arc::new(config),
        })
    }
}
