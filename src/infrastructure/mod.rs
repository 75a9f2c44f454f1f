pub mod clients;
pub mod config;
pub mod embedding;
pub mod extraction;
pub mod llm;
pub mod speech;
pub mod vector_store;

pub use config::{AppConfig, Config, Credentials, LlmProvider, PromptsConfig, VectorStoreProvider};
pub use embedding::TextEmbedding;
pub use extraction::DocumentTextExtractor;
pub use llm::{AnthropicLlm, OpenAiLlm};
pub use speech::WhisperTranscriber;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
