mod embedding;
mod extractor;
mod llm;
mod transcriber;
mod vector_store;

pub use embedding::EmbeddingService;
pub use extractor::TextExtractor;
pub use llm::LlmService;
pub use transcriber::Transcriber;
pub use vector_store::VectorStore;
